//! Resolved approval workflows and the people inside them
use super::employee::{Email, PersonalDetails, PersonalDetailsList};
use super::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Create,
    Edit,
    Remove,
}

// someone who submits through a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub email: Email,
    pub display_name: String,
    pub avatar: Option<String>,
}

// a resolved node in a forwarding chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approver {
    pub email: Email,
    pub forwards_to: Option<Email>,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_circular_reference: bool,
    pub is_in_multiple_workflows: bool, // same approver shows up in another workflow's chain
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApprovalWorkflow {
    pub members: Vec<Member>,
    pub approvers: Vec<Approver>,
    pub is_default: bool,
    pub action: Option<WorkflowAction>,
    pub remove_approval_workflow: bool,
}

/// Everything derived from one snapshot of the employee list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowOverview {
    pub approval_workflows: Vec<ApprovalWorkflow>,
    /// Every employee of the policy, in list order.
    pub available_members: Vec<Member>,
    /// First approver of each workflow, in workflow order.
    pub used_approver_emails: Vec<Email>,
}

impl Member {
    pub fn new(email: impl Into<Email>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            avatar: None,
        }
    }
    pub fn set_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
    /// Build a member from the personal details lookup, falling back to the raw email.
    pub fn from_details(email: &Email, personal_details: &PersonalDetailsList) -> Self {
        let details = personal_details.get(email);
        Self {
            email: email.clone(),
            display_name: display_name_or_email(email, details),
            avatar: details.and_then(|d| d.avatar.clone()),
        }
    }
}

impl Approver {
    pub fn new(email: impl Into<Email>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            forwards_to: None,
            display_name: display_name.into(),
            avatar: None,
            is_circular_reference: false,
            is_in_multiple_workflows: false,
        }
    }
    pub fn set_forwards_to(mut self, email: impl Into<Email>) -> Self {
        self.forwards_to = Some(email.into());
        self
    }
    pub fn set_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
    pub(crate) fn from_details(
        email: &Email,
        forwards_to: Option<Email>,
        personal_details: &PersonalDetailsList,
        is_circular_reference: bool,
    ) -> Self {
        let details = personal_details.get(email);
        Self {
            email: email.clone(),
            forwards_to,
            display_name: display_name_or_email(email, details),
            avatar: details.and_then(|d| d.avatar.clone()),
            is_circular_reference,
            is_in_multiple_workflows: false,
        }
    }
}

impl From<&Member> for Approver {
    fn from(member: &Member) -> Self {
        Self {
            email: member.email.clone(),
            forwards_to: None,
            display_name: member.display_name.clone(),
            avatar: member.avatar.clone(),
            is_circular_reference: false,
            is_in_multiple_workflows: false,
        }
    }
}

impl ApprovalWorkflow {
    pub fn new(members: Vec<Member>, approvers: Vec<Approver>) -> Self {
        Self {
            members,
            approvers,
            ..Self::default()
        }
    }
    pub fn set_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
    pub fn set_action(mut self, action: WorkflowAction) -> Self {
        self.action = Some(action);
        self
    }
    pub fn first_approver(&self) -> Option<&Approver> {
        self.approvers.first()
    }
    pub fn has_approver(&self, email: &Email) -> bool {
        self.approvers.iter().any(|approver| approver.email == *email)
    }
    pub fn has_member(&self, email: &Email) -> bool {
        self.members.iter().any(|member| member.email == *email)
    }
}

fn display_name_or_email(email: &Email, details: Option<&PersonalDetails>) -> String {
    details
        .and_then(|d| d.display_name.clone())
        .unwrap_or_else(|| email.to_string())
}

/// Checks a workflow can be persisted: it needs members, a first approver and no forwarding cycle.
pub fn validate_approval_workflow(workflow: &ApprovalWorkflow) -> Result<(), WorkflowError> {
    if workflow.members.is_empty() {
        return Err(WorkflowError::NoMembers);
    }
    if workflow.approvers.is_empty() {
        return Err(WorkflowError::MissingApprover);
    }
    if let Some(approver) = workflow.approvers.iter().find(|a| a.is_circular_reference) {
        return Err(WorkflowError::CircularReference(approver.email.clone()));
    }
    Ok(())
}

/// Members that can still be added to `workflow`.
///
/// With `prevent_self_approval` an approver of the workflow can not also submit through it.
pub fn selectable_members(
    overview: &WorkflowOverview,
    workflow: &ApprovalWorkflow,
    prevent_self_approval: bool,
) -> Vec<Member> {
    overview
        .available_members
        .iter()
        .filter(|member| !workflow.has_member(&member.email))
        .filter(|member| !prevent_self_approval || !workflow.has_approver(&member.email))
        .cloned()
        .collect()
}
