//! Property-based tests for the ledger.
//!
//! Properties:
//! - Id allocation: consecutive from 1, rejected creations allocate nothing
//! - Vote conservation: yes + no equals the number of accepted votes
//! - Active set: exactly the ids with now <= deadline, ascending

use super::clock::ManualClock;
use super::store::ProposalLedger;
use super::types::{Identity, VotePolicy};
use proptest::prelude::*;
use std::sync::Arc;

const NOW: u64 = 1_000_000;

fn ledger_at_now(policy: VotePolicy) -> ProposalLedger {
    ProposalLedger::with_clock(policy, Arc::new(ManualClock::new(NOW)))
}

proptest! {
    /// For any mix of valid and invalid deadlines, accepted creations get
    /// the consecutive ids 1, 2, 3, ... and rejections burn nothing.
    #[test]
    fn ids_are_dense_despite_rejections(
        offsets in prop::collection::vec(-500i64..500, 1..50),
    ) {
        let mut ledger = ledger_at_now(VotePolicy::Delegated);
        let creator = Identity::from("addr-creator");

        let mut expected_next = 1u64;
        for offset in offsets {
            let deadline = (NOW as i64 + offset) as u64;
            match ledger.create_proposal("t", "d", 0, "r", deadline, &creator) {
                Ok(id) => {
                    prop_assert!(offset > 0);
                    prop_assert_eq!(id, expected_next);
                    expected_next += 1;
                }
                Err(_) => prop_assert!(offset <= 0),
            }
        }
        prop_assert_eq!(ledger.total_proposals(), expected_next - 1);
    }

    /// Accepted votes are conserved: counters sum to the log length and the
    /// voter log preserves cast order.
    #[test]
    fn vote_counts_match_vote_log(
        votes in prop::collection::vec((0..20u32, any::<bool>()), 0..100),
    ) {
        let mut ledger = ledger_at_now(VotePolicy::Delegated);
        let id = ledger
            .create_proposal("t", "d", 0, "r", NOW + 60, &Identity::from("c"))
            .unwrap();

        let mut expected_yes = 0u64;
        let mut expected_order = Vec::new();
        for (voter_idx, support) in votes {
            let voter = Identity(format!("addr-{voter_idx}"));
            ledger.vote(id, support, &voter).unwrap();
            if support {
                expected_yes += 1;
            }
            expected_order.push(voter);
        }

        let view = ledger.get_proposal(id).unwrap();
        prop_assert_eq!(view.yes_count, expected_yes);
        prop_assert_eq!(
            view.yes_count + view.no_count,
            expected_order.len() as u64
        );
        prop_assert_eq!(ledger.get_voters(id), expected_order);
    }

    /// Under SelfChecked, each identity is counted at most once and
    /// has_voted reflects exactly the accepted voters.
    #[test]
    fn self_checked_dedups_voters(
        votes in prop::collection::vec((0..10u32, any::<bool>()), 0..60),
    ) {
        let mut ledger = ledger_at_now(VotePolicy::SelfChecked);
        let id = ledger
            .create_proposal("t", "d", 0, "r", NOW + 60, &Identity::from("c"))
            .unwrap();

        let mut seen = std::collections::HashSet::new();
        for (voter_idx, support) in votes {
            let voter = Identity(format!("addr-{voter_idx}"));
            let result = ledger.vote(id, support, &voter);
            prop_assert_eq!(result.is_ok(), seen.insert(voter.clone()));
            prop_assert!(ledger.has_voted(id, &voter));
        }

        let view = ledger.get_proposal(id).unwrap();
        prop_assert_eq!(view.yes_count + view.no_count, seen.len() as u64);
    }

    /// The active set is exactly the ascending ids still inside their window.
    #[test]
    fn active_set_matches_deadlines(
        deadlines in prop::collection::vec(1u64..200, 1..40),
        elapsed in 0u64..250,
    ) {
        let clock = ManualClock::new(NOW);
        let mut ledger =
            ProposalLedger::with_clock(VotePolicy::Delegated, Arc::new(clock.clone()));
        let creator = Identity::from("c");

        let mut by_id = Vec::new();
        for d in &deadlines {
            let id = ledger
                .create_proposal("t", "d", 0, "r", NOW + d, &creator)
                .unwrap();
            by_id.push((id, NOW + d));
        }

        clock.set(NOW + elapsed);
        let expected: Vec<u64> = by_id
            .iter()
            .filter(|(_, deadline)| NOW + elapsed <= *deadline)
            .map(|(id, _)| *id)
            .collect();
        prop_assert_eq!(ledger.active_proposals(), expected);
    }
}
