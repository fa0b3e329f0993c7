/*!
 * Anonymous Region Tests
 */

use memprobe::memory::{expected_checksum, page_checksum, AnonRegion};
use memprobe::ProbeError;
use pretty_assertions::assert_eq;

#[test]
fn test_fill_then_touch_counts_pages() {
    let mut region = AnonRegion::allocate(10 * 4096 + 1).unwrap();
    region.fill(b'A');
    assert!(region.holds_only(b'A'));

    let touched = region.touch_pages(4096, b'B');
    assert_eq!(touched, 11);
    assert!(!region.holds_only(b'A'));
    assert_eq!(region.as_slice()[4096], b'B');
    assert_eq!(region.as_slice()[4097], b'A');
}

#[test]
fn test_checksum_matches_expected() {
    let mut region = AnonRegion::allocate(64 * 4096).unwrap();
    region.fill(b'A');

    assert_eq!(page_checksum(region.as_slice(), 4096), expected_checksum(b'A', 64));
}

#[test]
fn test_zero_length_is_allocation_error() {
    let err = AnonRegion::allocate(0).unwrap_err();
    assert!(matches!(err, ProbeError::Allocation { size: 0, .. }));
}

#[test]
fn test_oversized_allocation_fails_cleanly() {
    let err = AnonRegion::allocate(1 << 62).unwrap_err();
    assert!(matches!(err, ProbeError::Allocation { .. }));
}
