//! Approval workflow resolution for workspace expense policies.
//!
//! The resolver modules are pure functions over snapshots of the employee list.
//! [`service::WorkflowService`] loads those snapshots from sled and writes the
//! results back.

pub mod config;
pub mod employee;
pub mod error;
pub mod mutation;
pub mod removal;
pub mod resolver;
pub mod service;
pub mod utils;
pub mod workflow;

pub use employee::{Email, PersonalDetails, PersonalDetailsList, PolicyEmployee, PolicyEmployeeList};
pub use mutation::{
    EdgeUpdate, EmployeePatch, MutationIntent, apply_patches,
    convert_approval_workflow_to_policy_employees,
};
pub use removal::update_workflow_data_on_approver_removal;
pub use resolver::{calculate_approvers, convert_policy_employees_to_approval_workflows};
pub use workflow::{ApprovalWorkflow, Approver, Member, WorkflowAction, WorkflowOverview};
