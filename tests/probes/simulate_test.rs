/*!
 * Simulator Command Tests
 */

use super::common::{memprobe, run, run_json, stdout_of};
use pretty_assertions::assert_eq;

const TEXTBOOK: [&str; 13] = ["7", "0", "1", "2", "0", "3", "0", "4", "2", "3", "0", "3", "2"];

#[test]
fn test_summary_lists_every_policy() {
    let mut args = vec!["simulate", "--frames", "3"];
    args.extend_from_slice(&TEXTBOOK);
    let output = run(&args);
    assert!(output.status.success());

    let text = stdout_of(&output);
    assert!(text.contains("PAGE REPLACEMENT SIMULATION RESULTS WITH ADDRESS TRANSLATION"));
    assert!(text.contains("FIFO: 10 page faults"));
    assert!(text.contains("LRU: 9 page faults"));
    assert!(text.contains("Optimal: 7 page faults"));
    assert!(text.contains("Clock: 9 page faults"));
}

#[test]
fn test_single_policy_json() {
    let mut args = vec!["simulate", "--frames", "3", "--policy", "optimal"];
    args.extend_from_slice(&TEXTBOOK);
    let report = run_json(&args);
    let runs = report["runs"].as_array().unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["policy"], "optimal");
    assert_eq!(runs[0]["faults"], 7);
    assert_eq!(runs[0]["steps"].as_array().unwrap().len(), 13);
}

#[test]
fn test_zero_frames_exits_one() {
    let output = run(&["simulate", "--frames", "0", "1", "2"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_pages_is_usage_error() {
    let output = run(&["simulate", "--frames", "3"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_fatal_error_reported_once_at_default_level() {
    let output = memprobe()
        .env_remove("RUST_LOG")
        .args(["simulate", "--frames", "0", "1", "2"])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr.matches("frame count must be greater than zero").count(), 1, "{}", stderr);
}
