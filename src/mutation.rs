//! Turns an edited approval workflow back into employee record patches
use super::employee::{Email, PendingAction, PendingFields, PolicyEmployee, PolicyEmployeeList};
use super::error::WorkflowError;
use super::workflow::{ApprovalWorkflow, WorkflowAction};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeUpdate {
    Set(Email),
    Clear,
}

/// How the store should present the record until the write is acknowledged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationIntent {
    pub pending_action: Option<PendingAction>,
    pub pending_fields: PendingFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeePatch {
    pub email: Email,
    pub forwards_to: Option<EdgeUpdate>,
    pub submits_to: Option<EdgeUpdate>,
    pub intent: MutationIntent,
}

impl EdgeUpdate {
    fn from_target(target: Option<&Email>) -> Self {
        match target {
            Some(email) => EdgeUpdate::Set(email.clone()),
            None => EdgeUpdate::Clear,
        }
    }
    fn target(&self) -> Option<&Email> {
        match self {
            EdgeUpdate::Set(email) if !email.is_empty() => Some(email),
            _ => None,
        }
    }
}

impl EmployeePatch {
    fn new(email: Email) -> Self {
        Self {
            email,
            forwards_to: None,
            submits_to: None,
            intent: MutationIntent::default(),
        }
    }
}

/// Patches that persist `workflow` under `action`, keyed by email.
///
/// Approvers are relinked in order and the last one forwards to nobody, unless a circular
/// entry closes the chain back onto an earlier approver. Members submit
/// to the first approver. `Remove` clears both edges instead. Edges already holding
/// the target value in `previous` are skipped, and untouched records are absent.
pub fn convert_approval_workflow_to_policy_employees(
    previous: &PolicyEmployeeList,
    workflow: &ApprovalWorkflow,
    action: WorkflowAction,
) -> Result<IndexMap<Email, EmployeePatch>, WorkflowError> {
    let first_approver = workflow.first_approver();
    if first_approver.is_none() && action != WorkflowAction::Remove {
        return Err(WorkflowError::MissingApprover);
    }

    let (pending_action, pending_field) = match action {
        WorkflowAction::Create => (None, PendingAction::Add),
        WorkflowAction::Edit => (None, PendingAction::Update),
        WorkflowAction::Remove => (Some(PendingAction::Update), PendingAction::Update),
    };

    let mut patches: IndexMap<Email, EmployeePatch> = IndexMap::new();

    for (index, approver) in workflow.approvers.iter().enumerate() {
        // the record behind a circular entry was already linked by its first occurrence
        if approver.is_circular_reference {
            continue;
        }
        let forwards_to = match action {
            WorkflowAction::Remove => EdgeUpdate::Clear,
            _ => EdgeUpdate::from_target(workflow.approvers.get(index + 1).map(|a| &a.email)),
        };
        let unchanged = previous
            .get(&approver.email)
            .is_some_and(|employee| employee.forwards_to() == forwards_to.target());
        if unchanged {
            continue;
        }

        let patch = patches
            .entry(approver.email.clone())
            .or_insert_with(|| EmployeePatch::new(approver.email.clone()));
        patch.forwards_to = Some(forwards_to);
        patch.intent.pending_action = pending_action;
        patch.intent.pending_fields.forwards_to = Some(pending_field);
    }

    for member in &workflow.members {
        let submits_to = match action {
            WorkflowAction::Remove => EdgeUpdate::Clear,
            _ => EdgeUpdate::from_target(first_approver.map(|a| &a.email)),
        };
        let unchanged = previous
            .get(&member.email)
            .is_some_and(|employee| employee.submits_to() == submits_to.target());
        if unchanged {
            continue;
        }

        let patch = patches
            .entry(member.email.clone())
            .or_insert_with(|| EmployeePatch::new(member.email.clone()));
        patch.submits_to = Some(submits_to);
        patch.intent.pending_action = pending_action;
        patch.intent.pending_fields.submits_to = Some(pending_field);
    }

    Ok(patches)
}

/// Merge patches into `employees`, adding a record for any email not yet present.
pub fn apply_patches<'a>(
    employees: &mut PolicyEmployeeList,
    patches: impl IntoIterator<Item = &'a EmployeePatch>,
) {
    for patch in patches {
        let employee = employees
            .entry(patch.email.clone())
            .or_insert_with(|| PolicyEmployee::new(&patch.email));

        if let Some(update) = &patch.forwards_to {
            employee.forwards_to = update.target().cloned();
            employee.pending_fields.forwards_to = patch.intent.pending_fields.forwards_to;
        }
        if let Some(update) = &patch.submits_to {
            employee.submits_to = update.target().cloned();
            employee.pending_fields.submits_to = patch.intent.pending_fields.submits_to;
        }
        if patch.intent.pending_action.is_some() {
            employee.pending_action = patch.intent.pending_action;
        }
    }
}
