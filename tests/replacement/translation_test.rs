/*!
 * Address Translation Tests
 * Physical addresses follow the frame slot a page landed in
 */

use memprobe::replacement::{
    generate_offsets, simulate_with_addresses, virtual_addresses, Policy, SimulationConfig,
};
use memprobe::ProbeError;
use pretty_assertions::assert_eq;

const PAGE: u64 = 4096;

fn config(frames: usize) -> SimulationConfig {
    SimulationConfig {
        frames,
        tlb_entries: 2,
        page_size: PAGE,
        seed: 7,
    }
}

#[test]
fn test_offsets_stay_inside_page() {
    let offsets = generate_offsets(500, PAGE, 1);
    assert_eq!(offsets.len(), 500);
    assert!(offsets.iter().all(|&o| o < PAGE));
}

#[test]
fn test_offsets_reproducible_per_seed() {
    assert_eq!(generate_offsets(32, PAGE, 9), generate_offsets(32, PAGE, 9));
}

#[test]
fn test_physical_address_uses_slot() {
    let reference = [5, 9, 5];
    let offsets = [0x10, 0x20, 0x30];
    let addresses = virtual_addresses(&reference, &offsets, PAGE).unwrap();
    assert_eq!(addresses, vec![5 * PAGE + 0x10, 9 * PAGE + 0x20, 5 * PAGE + 0x30]);

    let run = simulate_with_addresses(Policy::Fifo, &reference, &addresses, &config(2)).unwrap();
    let physical: Vec<u64> = run.steps.iter().map(|s| s.physical_addr).collect();

    assert_eq!(physical, vec![0x10, PAGE + 0x20, 0x30]);
    assert!(!run.steps[2].tlb_miss);
}

#[test]
fn test_evicted_page_reuses_victim_frame() {
    let reference = [1, 2, 3];
    let offsets = [0, 0, 0];
    let addresses = virtual_addresses(&reference, &offsets, PAGE).unwrap();
    let run = simulate_with_addresses(Policy::Fifo, &reference, &addresses, &config(2)).unwrap();

    // Page 1 was loaded first, so page 3 takes slot 0.
    assert_eq!(run.steps[2].frames, vec![3, 2]);
    assert_eq!(run.steps[2].physical_addr, 0);
}

#[test]
fn test_address_overflow_rejected() {
    let result = virtual_addresses(&[u64::MAX], &[0], PAGE);
    assert!(result.is_err());
}

#[test]
fn test_short_address_list_rejected() {
    let reference = [1, 2, 3];
    let addresses = [PAGE, 2 * PAGE];
    let err = simulate_with_addresses(Policy::Lru, &reference, &addresses, &config(2)).unwrap_err();

    assert!(matches!(err, ProbeError::InvalidConfig(_)));
}
