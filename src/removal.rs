//! Repairs approval workflows when an approver leaves the workspace
use super::employee::Email;
use super::workflow::{ApprovalWorkflow, Approver, Member};
use tracing::debug;

/// Workflows updated for the removal of `removed` from the workspace.
///
/// The workspace owner is the fallback approver. It takes the removed approver's place
/// in the default workflow and in any chain that would otherwise end early or go empty,
/// unless it already approves further along that chain. A workflow that would only
/// duplicate the default chain is flagged `remove_approval_workflow` instead.
pub fn update_workflow_data_on_approver_removal(
    approval_workflows: &[ApprovalWorkflow],
    removed: &Email,
    owner: &Member,
) -> Vec<ApprovalWorkflow> {
    let default_workflow = approval_workflows.iter().find(|w| w.is_default);
    let default_had_removed = default_workflow.is_some_and(|w| w.has_approver(removed));
    // after repair the default chain holds the owner in place of the removed approver
    let default_has_owner =
        default_had_removed || default_workflow.is_some_and(|w| w.has_approver(&owner.email));

    approval_workflows
        .iter()
        .map(|workflow| {
            let mut workflow = workflow.clone();

            if workflow.is_default {
                workflow.approvers = repair_chain(&workflow.approvers, removed, Some(owner));
                return workflow;
            }

            // the circular entry closing a cycle repeats an earlier approver
            let distinct: Vec<&Approver> = workflow
                .approvers
                .iter()
                .filter(|a| !a.is_circular_reference)
                .collect();
            let Some(index) = distinct.iter().position(|a| a.email == *removed) else {
                let only_owner = workflow.approvers.len() == 1 && workflow.has_approver(&owner.email);
                if default_had_removed && only_owner {
                    debug!(owner = %owner.email, "workflow duplicates the default chain");
                    workflow.remove_approval_workflow = true;
                }
                return workflow;
            };

            let last = distinct.len() - 1;
            if last == 0 {
                if default_has_owner {
                    workflow.remove_approval_workflow = true;
                } else {
                    workflow.approvers = vec![Approver::from(owner)];
                }
            } else {
                let substitute = (index == last).then_some(owner);
                workflow.approvers = repair_chain(&workflow.approvers, removed, substitute);
            }
            workflow
        })
        .collect()
}

/// `approvers` without `removed`, with its predecessor linked to whoever follows.
///
/// `substitute` takes the removed place unless it is already in the chain. A chain whose
/// last approver forwards back into it is closed with a single circular entry again.
fn repair_chain(approvers: &[Approver], removed: &Email, substitute: Option<&Member>) -> Vec<Approver> {
    let mut chain: Vec<Approver> = approvers
        .iter()
        .filter(|a| !a.is_circular_reference)
        .cloned()
        .collect();
    let Some(index) = chain.iter().position(|a| a.email == *removed) else {
        return approvers.to_vec();
    };
    let substitute = substitute.filter(|owner| !chain.iter().any(|a| a.email == owner.email));

    let gone = chain.remove(index);
    let next = chain
        .get(index)
        .map(|a| a.email.clone())
        .or(gone.forwards_to);
    let successor = match substitute {
        Some(owner) => {
            chain.insert(
                index,
                Approver {
                    forwards_to: next,
                    ..Approver::from(owner)
                },
            );
            Some(owner.email.clone())
        }
        None => next,
    };

    let relink = |approver: &mut Approver| {
        approver.forwards_to = successor.clone().filter(|target| *target != approver.email);
    };
    if index > 0 {
        relink(&mut chain[index - 1]);
    }
    for approver in chain.iter_mut().filter(|a| a.forwards_to.as_ref() == Some(removed)) {
        relink(approver);
    }

    let closing = chain
        .last()
        .and_then(|last| last.forwards_to.as_ref())
        .and_then(|target| chain.iter().find(|a| a.email == *target))
        .cloned();
    if let Some(mut repeat) = closing {
        repeat.is_circular_reference = true;
        chain.push(repeat);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approvers(emails: &[&str]) -> Vec<Approver> {
        let mut chain: Vec<Approver> = emails.iter().map(|e| Approver::new(*e, *e)).collect();
        for index in 1..chain.len() {
            chain[index - 1].forwards_to = Some(chain[index].email.clone());
        }
        chain
    }

    #[test]
    fn default_chain_keeps_forwarding_through_owner() {
        let workflows = vec![
            ApprovalWorkflow::new(vec![], approvers(&["2", "3", "4"])).set_default(true),
        ];
        let owner = Member::new("1", "Owner");

        let updated = update_workflow_data_on_approver_removal(&workflows, &Email::from("3"), &owner);
        let chain = &updated[0].approvers;

        assert_eq!(chain[1].email, Email::from("1"));
        assert_eq!(chain[1].forwards_to, Some(Email::from("4")));
        assert_eq!(chain[0].forwards_to, Some(Email::from("1")));
        assert!(!updated[0].remove_approval_workflow);
    }

    #[test]
    fn first_approver_is_spliced_out() {
        let workflows = vec![
            ApprovalWorkflow::new(vec![], approvers(&["5"])).set_default(true),
            ApprovalWorkflow::new(vec![], approvers(&["2", "3", "4"])),
        ];
        let owner = Member::new("1", "Owner");

        let updated = update_workflow_data_on_approver_removal(&workflows, &Email::from("2"), &owner);
        let chain: Vec<&str> = updated[1].approvers.iter().map(|a| a.email.as_str()).collect();

        assert_eq!(chain, ["3", "4"]);
        assert!(!updated[1].remove_approval_workflow);
    }

    #[test]
    fn owner_later_in_default_chain_is_not_doubled() {
        let workflows = vec![ApprovalWorkflow::new(vec![], approvers(&["2", "1"])).set_default(true)];
        let owner = Member::new("1", "Owner");

        let updated = update_workflow_data_on_approver_removal(&workflows, &Email::from("2"), &owner);

        assert_eq!(updated[0].approvers, approvers(&["1"]));
    }

    #[test]
    fn closed_cycle_is_rebuilt_around_owner() {
        let mut cycle = approvers(&["2", "3", "4"]);
        cycle[2].forwards_to = Some(Email::from("2"));
        let mut repeat = cycle[0].clone();
        repeat.is_circular_reference = true;
        cycle.push(repeat);
        let workflows = vec![
            ApprovalWorkflow::new(vec![], approvers(&["5"])).set_default(true),
            ApprovalWorkflow::new(vec![], cycle),
        ];
        let owner = Member::new("1", "Owner");

        let updated = update_workflow_data_on_approver_removal(&workflows, &Email::from("4"), &owner);
        let chain: Vec<(&str, bool)> = updated[1]
            .approvers
            .iter()
            .map(|a| (a.email.as_str(), a.is_circular_reference))
            .collect();

        assert_eq!(chain, [("2", false), ("3", false), ("1", false), ("2", true)]);
        assert_eq!(updated[1].approvers[2].forwards_to, Some(Email::from("2")));
    }
}
