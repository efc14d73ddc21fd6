//! Property Tests - randomized invariants over complete instances.
//!
//! Complete, strictly ranked, equal-size instances must always produce
//! a perfect, valid, stable matching within the proposal budget, and
//! repeated runs on cloned input must agree.

use proptest::prelude::*;
use stable_match::{MatchingEngine, PreferenceRegistry};
use std::collections::{HashMap, HashSet};

type Instance = (Vec<(u32, Vec<u32>)>, Vec<(u32, Vec<u32>)>);

const RECEIVER_BASE: u32 = 10_000;

fn complete_instance(max_n: usize) -> impl Strategy<Value = Instance> {
    (1..=max_n).prop_flat_map(|n| {
        let proposer_ids: Vec<u32> = (0..n as u32).collect();
        let receiver_ids: Vec<u32> = (0..n as u32).map(|i| RECEIVER_BASE + i).collect();
        (
            prop::collection::vec(Just(proposer_ids).prop_shuffle(), n),
            prop::collection::vec(Just(receiver_ids).prop_shuffle(), n),
        )
            .prop_map(move |(receiver_lists, proposer_lists)| {
                let receivers = receiver_lists
                    .into_iter()
                    .enumerate()
                    .map(|(i, list)| (RECEIVER_BASE + i as u32, list))
                    .collect();
                let proposers = proposer_lists
                    .into_iter()
                    .enumerate()
                    .map(|(i, list)| (i as u32, list))
                    .collect();
                (receivers, proposers)
            })
    })
}

/// Direct blocking-pair scan over the raw preference lists.
fn has_blocking_pair(instance: &Instance, assignment: &HashMap<u32, u32>) -> bool {
    let (receivers, proposers) = instance;
    let rank = |list: &[u32], agent: u32| list.iter().position(|&a| a == agent);
    let partner_of_proposer: HashMap<u32, u32> =
        assignment.iter().map(|(&r, &p)| (p, r)).collect();

    for (p, p_list) in proposers {
        for (r, r_list) in receivers {
            if assignment.get(r) == Some(p) {
                continue;
            }
            let p_prefers = match partner_of_proposer.get(p) {
                Some(&current) => rank(p_list, *r) < rank(p_list, current),
                None => true,
            };
            let r_prefers = match assignment.get(r) {
                Some(&current) => rank(r_list, *p) < rank(r_list, current),
                None => true,
            };
            if p_prefers && r_prefers {
                return true;
            }
        }
    }
    false
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn complete_instances_yield_perfect_stable_matchings(
        instance in complete_instance(8)
    ) {
        let (receivers, proposers) = instance.clone();
        let n = proposers.len();

        let registry = PreferenceRegistry::build(receivers, proposers).unwrap();
        let total_prefs = registry.total_preferences() as u64;
        let report = MatchingEngine::new(registry).run().unwrap();

        // Perfect: every receiver is engaged
        prop_assert_eq!(report.matching.len(), n);

        // Valid: no proposer appears under two receivers
        let mut seen = HashSet::new();
        for (_, &p) in report.matching.pairs() {
            prop_assert!(seen.insert(p));
        }

        // Within the termination budget
        prop_assert!(report.stats.proposals <= total_prefs);

        // Stable: no blocking pair
        let assignment: HashMap<u32, u32> =
            report.matching.pairs().map(|(&r, &p)| (r, p)).collect();
        prop_assert!(!has_blocking_pair(&instance, &assignment));
    }

    #[test]
    fn runs_on_cloned_input_agree(instance in complete_instance(6)) {
        let (r1, p1) = instance.clone();
        let (r2, p2) = instance;

        let first = MatchingEngine::new(PreferenceRegistry::build(r1, p1).unwrap())
            .run()
            .unwrap();
        let second = MatchingEngine::new(PreferenceRegistry::build(r2, p2).unwrap())
            .run()
            .unwrap();

        prop_assert_eq!(first.matching, second.matching);
        prop_assert_eq!(first.events, second.events);
        prop_assert_eq!(first.stats, second.stats);
    }
}
