/*!
 * Copy-On-Write Probe Tests
 * Runs the fork path end to end and checks the parent/child accounting
 */

use super::common::{run, run_json, stdout_of};
use pretty_assertions::assert_eq;
use serial_test::serial;

#[test]
#[serial]
fn test_cow_child_writes_every_page() {
    let report = run_json(&["cow", "--size-mb", "16"]);

    assert_eq!(report["buffer_bytes"], 16 * 1024 * 1024);
    assert_eq!(report["child"]["pages_written"], 4096);
    assert_eq!(report["parent_intact"], true);
    assert_ne!(report["child"]["pid"], report["parent_pid"]);
}

#[test]
#[serial]
fn test_cow_snapshot_labels_in_order() {
    let report = run_json(&["cow", "--size-mb", "4"]);

    let labels = |v: &serde_json::Value| -> Vec<String> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|s| s["label"].as_str().unwrap().to_string())
            .collect()
    };

    assert_eq!(
        labels(&report["snapshots"]),
        vec![
            "Parent before fork",
            "Parent after fork (sharing memory)",
            "Parent after child completes",
        ]
    );
    assert_eq!(
        labels(&report["child"]["snapshots"]),
        vec!["Child after fork (before COW)", "Child after COW writes"]
    );
}

#[test]
#[serial]
fn test_cow_fork_does_not_copy_parent_buffer() {
    let report = run_json(&["cow", "--size-mb", "64"]);
    let snapshots = report["snapshots"].as_array().unwrap();
    let before = snapshots[0]["snapshot"]["vm_rss_kb"].as_i64().unwrap();
    let after = snapshots[1]["snapshot"]["vm_rss_kb"].as_i64().unwrap();

    // A copied buffer would add 64 MiB; allow far less than that
    assert!((after - before).abs() < 16 * 1024, "rss moved {} kB across fork", after - before);
}

#[test]
#[serial]
fn test_cow_text_output() {
    let output = run(&["cow", "--size-mb", "2"]);
    assert!(output.status.success());

    let text = stdout_of(&output);
    assert!(text.contains("Copy-On-Write Demonstration"));
    assert!(text.contains("Parent allocated 2 MB"));
    assert!(text.contains("Parent before fork - PID: "));
    assert!(text.contains("Child: COW triggered"));
    assert!(text.contains("COW demonstration complete"));
}

#[test]
fn test_cow_allocation_failure_exits_one() {
    let output = run(&["cow", "--size-mb", "1099511627776"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout_of(&output).contains("Parent before fork"));
}
