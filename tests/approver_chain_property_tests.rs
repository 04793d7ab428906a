//! Property-based tests for approver chain walking
//!
//! This module uses proptest to check that `calculate_approvers` behaves across
//! arbitrary forwarding graphs, cycles and self-loops included. Chain walking
//! has to terminate on adversarial input, and every cycle has to surface as
//! exactly one circular entry at the end of the chain.

use approval_workflows::{
    employee::{Email, PersonalDetailsList, PolicyEmployee, PolicyEmployeeList},
    resolver::calculate_approvers,
};
use proptest::prelude::*;
use std::collections::HashSet;

// These property tests cover:
//
// 1. Termination and bounded length on any forwarding graph
// 2. Exact N + 1 length and order for acyclic chains
// 3. Circular flag placement on cyclic chains
// 4. Consistency between approvers and the employee list they came from
//

fn email(id: usize) -> Email {
    Email::new(format!("{id}@example.com"))
}

/// Strategy for an arbitrary forwarding graph of 1 to 12 employees.
/// Targets may point at anyone, the employee itself or someone outside the list.
fn forwarding_graph_strategy() -> impl Strategy<Value = PolicyEmployeeList> {
    (1usize..=12).prop_flat_map(|size| {
        prop::collection::vec(prop::option::of(0..size + 2), size).prop_map(|targets| {
            targets
                .into_iter()
                .enumerate()
                .map(|(id, target)| {
                    let mut employee = PolicyEmployee::new(email(id));
                    employee.forwards_to = target.map(email);
                    (email(id), employee)
                })
                .collect()
        })
    })
}

/// Strategy for a straight chain 0 -> 1 -> ... -> n with n forwards
fn acyclic_chain_strategy() -> impl Strategy<Value = (PolicyEmployeeList, usize)> {
    (0usize..=10).prop_map(|forwards| {
        let employees = (0..=forwards)
            .map(|id| {
                let mut employee = PolicyEmployee::new(email(id));
                if id < forwards {
                    employee.forwards_to = Some(email(id + 1));
                }
                (email(id), employee)
            })
            .collect();
        (employees, forwards)
    })
}

proptest! {
    /// Property: the walk always terminates, and each email shows up at most twice
    #[test]
    fn prop_walk_terminates(employees in forwarding_graph_strategy(), start in 0usize..12) {
        let approvers = calculate_approvers(&employees, &email(start), &PersonalDetailsList::new());

        // each employee at most once, plus one repeat or one outside delegate
        prop_assert!(approvers.len() <= employees.len() + 1);

        let circular = approvers.iter().filter(|a| a.is_circular_reference).count();
        prop_assert!(circular <= 1, "At most one circular entry");
        if circular == 1 {
            prop_assert!(approvers.last().unwrap().is_circular_reference, "Circular entry closes the chain");
        }
    }

    /// Property: an approver list is empty exactly when the start is not an employee
    #[test]
    fn prop_empty_only_for_unknown_start(employees in forwarding_graph_strategy(), start in 0usize..14) {
        let approvers = calculate_approvers(&employees, &email(start), &PersonalDetailsList::new());

        prop_assert_eq!(approvers.is_empty(), !employees.contains_key(&email(start)));
    }

    /// Property: consecutive approvers are linked by forwards_to
    #[test]
    fn prop_chain_is_linked(employees in forwarding_graph_strategy(), start in 0usize..12) {
        let approvers = calculate_approvers(&employees, &email(start), &PersonalDetailsList::new());

        for pair in approvers.windows(2) {
            prop_assert_eq!(pair[0].forwards_to.as_ref(), Some(&pair[1].email));
        }
        // only the entries before the circular one are distinct
        let open = approvers.iter().filter(|a| !a.is_circular_reference);
        let mut seen = HashSet::new();
        for approver in open {
            prop_assert!(seen.insert(approver.email.clone()), "Approver repeated before the cycle was flagged");
        }
    }

    /// Property: a chain of N forwards yields N + 1 approvers in order, none circular
    #[test]
    fn prop_acyclic_chain_length((employees, forwards) in acyclic_chain_strategy()) {
        let approvers = calculate_approvers(&employees, &email(0), &PersonalDetailsList::new());

        prop_assert_eq!(approvers.len(), forwards + 1);
        for (index, approver) in approvers.iter().enumerate() {
            prop_assert_eq!(&approver.email, &email(index));
            prop_assert!(!approver.is_circular_reference);
        }
    }

    /// Property: closing a chain back onto its start flags the start as circular
    #[test]
    fn prop_closed_chain_flags_start(size in 1usize..=10) {
        let employees: PolicyEmployeeList = (0..size)
            .map(|id| {
                let employee = PolicyEmployee::new(email(id)).set_forwards_to(email((id + 1) % size));
                (email(id), employee)
            })
            .collect();

        let approvers = calculate_approvers(&employees, &email(0), &PersonalDetailsList::new());

        prop_assert_eq!(approvers.len(), size + 1);
        let last = approvers.last().unwrap();
        prop_assert_eq!(&last.email, &email(0));
        prop_assert!(last.is_circular_reference);
        prop_assert_eq!(last.forwards_to.as_ref(), Some(&email(1 % size)));
    }
}
