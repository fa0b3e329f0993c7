/*!
 * Snapshot Reader Tests
 * procfs parsing against a fake root and the live process
 */

use memprobe::memory::{current_pid, parse_status, ProcStatusReader, SnapshotProvider};
use memprobe::SnapshotError;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const STATUS: &str = "Name:\tprobe\nVmPeak:\t  20000 kB\nVmSize:\t  18432 kB\nVmRSS:\t    2048 kB\n";

#[test]
fn test_reads_fake_proc_root() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("77")).unwrap();
    std::fs::write(root.path().join("77").join("status"), STATUS).unwrap();

    let reader = ProcStatusReader::with_root(root.path());
    let snap = reader.snapshot(77).unwrap();

    assert_eq!((snap.pid, snap.vm_size_kb, snap.vm_rss_kb), (77, 18432, 2048));
}

#[test]
fn test_missing_pid_is_unavailable() {
    let root = TempDir::new().unwrap();
    let reader = ProcStatusReader::with_root(root.path());

    assert!(matches!(reader.snapshot(1), Err(SnapshotError::Unavailable { .. })));
}

#[test]
fn test_missing_pid_falls_back_to_zero() {
    let root = TempDir::new().unwrap();
    let reader = ProcStatusReader::with_root(root.path());
    let snap = reader.snapshot_or_zero();

    assert_eq!((snap.vm_size_kb, snap.vm_rss_kb), (0, 0));
    assert_eq!(snap.pid, current_pid());
}

#[test]
fn test_parse_without_vm_fields() {
    assert_eq!(parse_status("Name:\tkthreadd\n").unwrap(), (0, 0));
}

#[test]
fn test_live_process_has_rss() {
    let snap = ProcStatusReader::new().snapshot_self().unwrap();
    assert!(snap.vm_rss_kb > 0);
    assert!(snap.vm_size_kb >= snap.vm_rss_kb);
}
