/*!
 * TLB Probe Tests
 */

use super::common::{run, run_json, stdout_of};
use pretty_assertions::assert_eq;

#[test]
fn test_sequential_only() {
    let report = run_json(&["tlb", "sequential", "--elements", "1000", "--iterations", "2"]);
    let timings = report["timings"].as_array().unwrap();

    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0]["pattern"], "sequential");
    assert_eq!(timings[0]["accesses"], 2000);
    assert_eq!(timings[0]["sum"], 2 * 499_500);
}

#[test]
fn test_random_only() {
    let report = run_json(&["tlb", "random", "--elements", "4096", "--random-accesses", "1000"]);
    let timings = report["timings"].as_array().unwrap();

    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0]["pattern"], "random");
    assert_eq!(timings[0]["accesses"], 1000);
}

#[test]
fn test_random_sum_is_reproducible() {
    let args = ["tlb", "random", "--elements", "4096", "--random-accesses", "500", "--seed", "7"];
    let first = run_json(&args);
    let second = run_json(&args);

    assert_eq!(first["timings"][0]["sum"], second["timings"][0]["sum"]);
}

#[test]
fn test_both_patterns_print_perf_hint() {
    let output = run(&[
        "tlb",
        "--elements",
        "1024",
        "--iterations",
        "1",
        "--random-accesses",
        "100",
    ]);
    assert!(output.status.success());

    let text = stdout_of(&output);
    assert!(text.contains("Sequential vs Random Memory Access:"));
    assert!(text.contains("Sequential access time: "));
    assert!(text.contains("Random access time: "));
    assert!(text.contains("perf stat -e dTLB-load-misses"));
}

#[test]
fn test_oversized_random_accesses_exits_one() {
    let max = usize::MAX.to_string();
    let output = run(&["tlb", "random", "--elements", "16", "--random-accesses", &max]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout_of(&output).contains("Random access time"));
}

#[test]
fn test_unknown_pattern_is_usage_error() {
    let output = run(&["tlb", "diagonal"]);
    assert_eq!(output.status.code(), Some(2));
}
