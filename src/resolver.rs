//! Derives approver chains and approval workflows from a snapshot of the employee list
use super::employee::{Email, PersonalDetailsList, PolicyEmployeeList};
use super::workflow::{ApprovalWorkflow, Approver, Member, WorkflowOverview};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Walk the forwarding chain starting at `first_email`.
///
/// The walk ends at an employee without a delegate, at a delegate that is not an employee,
/// or one step past the first repeated email. That repeat is flagged `is_circular_reference`.
pub fn calculate_approvers(
    employees: &PolicyEmployeeList,
    first_email: &Email,
    personal_details: &PersonalDetailsList,
) -> Vec<Approver> {
    let mut approvers = Vec::new();
    let mut visited: HashSet<&Email> = HashSet::new();

    let Some((mut email, mut employee)) = employees.get_key_value(first_email) else {
        return approvers;
    };

    loop {
        visited.insert(email);

        let Some(next) = employee.forwards_to() else {
            approvers.push(Approver::from_details(email, None, personal_details, false));
            break;
        };
        approvers.push(Approver::from_details(
            email,
            Some(next.clone()),
            personal_details,
            false,
        ));

        match employees.get_key_value(next) {
            Some((next_email, next_employee)) if visited.contains(next_email) => {
                warn!(approver = %next_email, "circular forwarding chain");
                approvers.push(Approver::from_details(
                    next_email,
                    next_employee.forwards_to().cloned(),
                    personal_details,
                    true,
                ));
                break;
            }
            Some((next_email, next_employee)) => {
                email = next_email;
                employee = next_employee;
            }
            None => {
                // delegate is not part of the policy, it closes the chain
                approvers.push(Approver::from_details(next, None, personal_details, false));
                break;
            }
        }
    }

    approvers
}

/// Group employees into approval workflows keyed by their raw `submits_to`.
///
/// Employees whose manager is not an employee themselves are left out. The default
/// workflow sorts first and the rest follow `compare` on their first approver's name.
pub fn convert_policy_employees_to_approval_workflows<F>(
    employees: &PolicyEmployeeList,
    default_approver: &Email,
    personal_details: &PersonalDetailsList,
    compare: F,
) -> WorkflowOverview
where
    F: Fn(&str, &str) -> Ordering,
{
    let mut grouped: IndexMap<&Email, ApprovalWorkflow> = IndexMap::new();

    for employee in employees.values() {
        let Some(submits_to) = employee.submits_to() else {
            continue;
        };
        let Some((manager, _)) = employees.get_key_value(submits_to) else {
            debug!(employee = %employee.email, manager = %submits_to, "submits to a non-employee");
            continue;
        };

        grouped
            .entry(manager)
            .or_insert_with(|| ApprovalWorkflow {
                approvers: calculate_approvers(employees, manager, personal_details),
                is_default: manager == default_approver,
                ..ApprovalWorkflow::default()
            })
            .members
            .push(Member::from_details(&employee.email, personal_details));
    }

    let mut approval_workflows: Vec<ApprovalWorkflow> = grouped.into_values().collect();
    mark_shared_approvers(&mut approval_workflows);

    approval_workflows.sort_by(|a, b| match (a.is_default, b.is_default) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare(first_approver_name(a), first_approver_name(b)),
    });

    let available_members = employees
        .keys()
        .map(|email| Member::from_details(email, personal_details))
        .collect();

    let mut used_approver_emails: Vec<Email> = Vec::new();
    for approver in approval_workflows.iter().filter_map(|w| w.first_approver()) {
        if !used_approver_emails.contains(&approver.email) {
            used_approver_emails.push(approver.email.clone());
        }
    }

    WorkflowOverview {
        approval_workflows,
        available_members,
        used_approver_emails,
    }
}

fn first_approver_name(workflow: &ApprovalWorkflow) -> &str {
    workflow
        .first_approver()
        .map(|approver| approver.display_name.as_str())
        .unwrap_or_default()
}

// an approver counts once per workflow no matter how often the chain repeats it
fn mark_shared_approvers(workflows: &mut [ApprovalWorkflow]) {
    let mut usage: HashMap<Email, usize> = HashMap::new();
    for workflow in workflows.iter() {
        let distinct: HashSet<&Email> = workflow.approvers.iter().map(|a| &a.email).collect();
        for email in distinct {
            *usage.entry(email.clone()).or_default() += 1;
        }
    }

    for approver in workflows.iter_mut().flat_map(|w| w.approvers.iter_mut()) {
        approver.is_in_multiple_workflows = usage.get(&approver.email).is_some_and(|n| *n > 1);
    }
}
