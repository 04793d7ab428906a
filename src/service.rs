//! Service layer API for approval workflow operations
use super::config::WorkflowConfig;
use super::employee::{Email, PersonalDetails, PersonalDetailsList, PolicyEmployee, PolicyEmployeeList};
use super::mutation::{EmployeePatch, apply_patches, convert_approval_workflow_to_policy_employees};
use super::removal::update_workflow_data_on_approver_removal;
use super::resolver::convert_policy_employees_to_approval_workflows;
use super::workflow::{
    ApprovalWorkflow, Member, WorkflowAction, WorkflowOverview, validate_approval_workflow,
};
use anyhow::Context;
use indexmap::IndexMap;
use sled::Batch;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

const EMPLOYEE_PREFIX: &str = "employee/";
const DETAILS_PREFIX: &str = "details/";

pub struct WorkflowService {
    instance: Arc<sled::Db>,
    config: WorkflowConfig,
}

impl WorkflowService {
    pub fn new(instance: Arc<sled::Db>, config: WorkflowConfig) -> Self {
        Self { instance, config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Store or overwrite a single employee record
    pub fn put_employee(&self, employee: &PolicyEmployee) -> anyhow::Result<()> {
        self.instance
            .insert(employee_key(&employee.email), minicbor::to_vec(employee)?)?;
        Ok(())
    }

    /// Store the display identity used when resolving workflows
    pub fn put_personal_details(
        &self,
        email: &Email,
        details: &PersonalDetails,
    ) -> anyhow::Result<()> {
        self.instance
            .insert(details_key(email), minicbor::to_vec(details)?)?;
        Ok(())
    }

    /// Load the employee list, ordered by email
    pub fn load_employees(&self) -> anyhow::Result<PolicyEmployeeList> {
        let mut employees = PolicyEmployeeList::new();
        for entry in self.instance.scan_prefix(EMPLOYEE_PREFIX) {
            let (_, value) = entry?;
            let employee: PolicyEmployee =
                minicbor::decode(&value).context("corrupt employee record")?;
            employees.insert(employee.email.clone(), employee);
        }
        Ok(employees)
    }

    pub fn load_personal_details(&self) -> anyhow::Result<PersonalDetailsList> {
        let mut details = PersonalDetailsList::new();
        for entry in self.instance.scan_prefix(DETAILS_PREFIX) {
            let (key, value) = entry?;
            let email = std::str::from_utf8(&key[DETAILS_PREFIX.len()..])
                .context("personal details key is not utf-8")?;
            let record: PersonalDetails =
                minicbor::decode(&value).context("corrupt personal details record")?;
            details.insert(Email::from(email), record);
        }
        Ok(details)
    }

    /// Resolve every approval workflow from the stored snapshot
    pub fn approval_workflows<F>(&self, compare: F) -> anyhow::Result<WorkflowOverview>
    where
        F: Fn(&str, &str) -> Ordering,
    {
        let employees = self.load_employees()?;
        let personal_details = self.load_personal_details()?;

        Ok(convert_policy_employees_to_approval_workflows(
            &employees,
            &self.config.default_approver,
            &personal_details,
            compare,
        ))
    }

    /// Persist a created, edited or removed workflow. Returns the patches that were written.
    pub fn save_approval_workflow(
        &self,
        workflow: &ApprovalWorkflow,
        action: WorkflowAction,
    ) -> anyhow::Result<IndexMap<Email, EmployeePatch>> {
        if action != WorkflowAction::Remove {
            validate_approval_workflow(workflow)?;
        }

        let mut employees = self.load_employees()?;
        let patches = convert_approval_workflow_to_policy_employees(&employees, workflow, action)?;

        let mut batch = Batch::default();
        self.stage_patches(&mut batch, &mut employees, patches.values())?;
        self.instance.apply_batch(batch)?;

        info!(?action, records = patches.len(), "approval workflow saved");
        Ok(patches)
    }

    /// Remove an approver from the workspace and repair every workflow they were part of.
    ///
    /// The configured owner steps in where needed, and workflows that collapse into the
    /// default are removed. The approver's own employee record is deleted in the same batch.
    pub fn remove_approver<F>(
        &self,
        removed: &Email,
        compare: F,
    ) -> anyhow::Result<Vec<ApprovalWorkflow>>
    where
        F: Fn(&str, &str) -> Ordering,
    {
        let mut employees = self.load_employees()?;
        let personal_details = self.load_personal_details()?;
        let overview = convert_policy_employees_to_approval_workflows(
            &employees,
            &self.config.default_approver,
            &personal_details,
            compare,
        );
        let owner = Member::from_details(&self.config.owner, &personal_details);

        let updated =
            update_workflow_data_on_approver_removal(&overview.approval_workflows, removed, &owner);

        // a workflow is only flagged for removal while a default chain exists
        let default_workflow = updated.iter().find(|w| w.is_default);

        let mut batch = Batch::default();
        for (before, after) in overview.approval_workflows.iter().zip(&updated) {
            let flagged = after.remove_approval_workflow;
            let patches = if let (true, Some(default)) = (flagged, default_workflow) {
                // members fall back to the default chain
                convert_approval_workflow_to_policy_employees(
                    &employees,
                    &ApprovalWorkflow::new(after.members.clone(), default.approvers.clone()),
                    WorkflowAction::Edit,
                )?
            } else if after.approvers != before.approvers {
                convert_approval_workflow_to_policy_employees(&employees, after, WorkflowAction::Edit)?
            } else {
                continue;
            };
            self.stage_patches(&mut batch, &mut employees, patches.values())?;
        }

        if employees.shift_remove(removed).is_some() {
            batch.remove(employee_key(removed));
        }
        self.instance
            .apply_batch(batch)
            .context("failed to persist approver removal")?;

        if self.config.default_approver == *removed {
            warn!(approver = %removed, "removed approver is still the configured default approver");
        }
        info!(approver = %removed, "approver removed from workflows");
        Ok(updated)
    }

    // apply patches to the in-memory list and queue the touched records for writing
    fn stage_patches<'a>(
        &self,
        batch: &mut Batch,
        employees: &mut PolicyEmployeeList,
        patches: impl IntoIterator<Item = &'a EmployeePatch> + Clone,
    ) -> anyhow::Result<()> {
        apply_patches(employees, patches.clone());
        for patch in patches {
            if let Some(employee) = employees.get(&patch.email) {
                batch.insert(employee_key(&employee.email), minicbor::to_vec(employee)?);
            }
        }
        Ok(())
    }
}

fn employee_key(email: &Email) -> Vec<u8> {
    format!("{EMPLOYEE_PREFIX}{email}").into_bytes()
}

fn details_key(email: &Email) -> Vec<u8> {
    format!("{DETAILS_PREFIX}{email}").into_bytes()
}
