/*!
 * Policy Invariant Tests
 * Properties every replacement policy must hold on arbitrary reference strings
 */

use memprobe::replacement::{simulate, simulate_policies, Policy, SimulationConfig};
use proptest::prelude::*;
use std::collections::HashSet;

fn config(frames: usize, tlb_entries: usize) -> SimulationConfig {
    SimulationConfig {
        frames,
        tlb_entries,
        page_size: 4096,
        seed: 42,
    }
}

fn policy_strategy() -> impl Strategy<Value = Policy> {
    prop::sample::select(Policy::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_frames_bounded_and_distinct(
        reference in prop::collection::vec(0u64..10, 1..60),
        frames in 1usize..6,
        policy in policy_strategy(),
    ) {
        let run = simulate(policy, &reference, &config(frames, 4)).unwrap();

        for step in &run.steps {
            prop_assert!(step.frames.len() <= frames);
            let unique: HashSet<_> = step.frames.iter().collect();
            prop_assert_eq!(unique.len(), step.frames.len());
            prop_assert!(step.frames.contains(&step.page));
        }
    }

    #[test]
    fn prop_fault_count_bounds(
        reference in prop::collection::vec(0u64..10, 1..60),
        frames in 1usize..6,
        policy in policy_strategy(),
    ) {
        let run = simulate(policy, &reference, &config(frames, 4)).unwrap();
        let distinct: HashSet<_> = reference.iter().collect();

        prop_assert!(run.faults >= distinct.len());
        prop_assert!(run.faults <= reference.len());
        prop_assert_eq!(run.steps.iter().filter(|s| s.fault).count(), run.faults);
    }

    #[test]
    fn prop_optimal_never_loses(
        reference in prop::collection::vec(0u64..8, 1..50),
        frames in 1usize..5,
    ) {
        let runs = simulate_policies(&Policy::ALL, &reference, &config(frames, 4)).unwrap();
        let optimal = runs.iter().find(|r| r.policy == Policy::Optimal).unwrap().faults;

        for run in &runs {
            prop_assert!(optimal <= run.faults, "{} beat Optimal", run.policy);
        }
    }

    #[test]
    fn prop_every_fault_is_a_tlb_miss(
        reference in prop::collection::vec(0u64..10, 1..60),
        frames in 1usize..6,
        tlb_entries in 1usize..6,
        policy in policy_strategy(),
    ) {
        let run = simulate(policy, &reference, &config(frames, tlb_entries)).unwrap();

        prop_assert_eq!(run.tlb.lookups(), reference.len() as u64);
        prop_assert!(run.tlb.misses >= run.faults as u64);
        for step in run.steps.iter().filter(|s| s.fault) {
            prop_assert!(step.tlb_miss);
        }
    }
}

#[test]
fn test_enough_frames_only_cold_misses() {
    let reference = [1, 2, 3, 1, 2, 3, 1, 2, 3];
    for policy in Policy::ALL {
        let run = simulate(policy, &reference, &config(3, 4)).unwrap();
        assert_eq!(run.faults, 3, "{}", policy);
    }
}

#[test]
fn test_single_frame_faults_on_every_change() {
    let reference = [1, 1, 2, 2, 1, 3, 3];
    for policy in Policy::ALL {
        let run = simulate(policy, &reference, &config(1, 4)).unwrap();
        assert_eq!(run.faults, 4, "{}", policy);
    }
}
