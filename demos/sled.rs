// Walks a small workspace through resolving, editing and repairing its approval workflows.
//
// Run with `RUST_LOG=debug cargo run --example sled` to see the resolver's events.

use approval_workflows::{
    config::WorkflowConfig,
    employee::{Email, PersonalDetails, PolicyEmployee},
    service::WorkflowService,
    utils::locale_compare,
    workflow::{ApprovalWorkflow, WorkflowAction},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
default_approver = "alice@example.com"
owner = "alice@example.com"
prevent_self_approval = true
"#;

fn print_workflows(title: &str, workflows: &[ApprovalWorkflow]) {
    println!("== {title}");
    for workflow in workflows {
        let approvers: Vec<&str> = workflow.approvers.iter().map(|a| a.display_name.as_str()).collect();
        let members: Vec<&str> = workflow.members.iter().map(|m| m.display_name.as_str()).collect();
        println!(
            "{}{} <- [{}]",
            if workflow.is_default { "(default) " } else { "" },
            approvers.join(" -> "),
            members.join(", "),
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let temp_dir = tempfile::tempdir()?;
    let db = sled::open(temp_dir.path().join("workflows.db"))?;
    let service = WorkflowService::new(Arc::new(db), WorkflowConfig::from_toml_str(CONFIG)?);

    let people = [
        ("alice", "Alice Owner", None, "alice"),
        ("bob", "Bob Manager", Some("carol"), "alice"),
        ("carol", "Carol Finance", None, "alice"),
        ("dave", "Dave Engineer", None, "bob"),
        ("erin", "Erin Engineer", None, "bob"),
        ("frank", "Frank Sales", None, "ghost"),
    ];
    for (name, display_name, forwards_to, submits_to) in people {
        let email = Email::new(format!("{name}@example.com"));
        let mut employee = PolicyEmployee::new(&email).set_submits_to(format!("{submits_to}@example.com"));
        if let Some(delegate) = forwards_to {
            employee = employee.set_forwards_to(format!("{delegate}@example.com"));
        }
        service.put_employee(&employee)?;
        service.put_personal_details(&email, &PersonalDetails::new(display_name))?;
    }

    let overview = service.approval_workflows(locale_compare)?;
    print_workflows("resolved", &overview.approval_workflows);

    // dave now reports straight to carol
    if let Some(engineering) = overview.approval_workflows.get(1) {
        let mut edited = engineering.clone().set_action(WorkflowAction::Edit);
        edited.approvers.remove(0);
        edited.members.retain(|m| m.email.as_str() == "dave@example.com");
        service.save_approval_workflow(&edited, WorkflowAction::Edit)?;
    }
    let overview = service.approval_workflows(locale_compare)?;
    print_workflows("after edit", &overview.approval_workflows);

    let repaired = service.remove_approver(&Email::from("carol@example.com"), locale_compare)?;
    print_workflows("carol removed", &repaired);

    Ok(())
}
