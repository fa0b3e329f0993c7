/*!
 * Page Fault Probe Tests
 * Backing file lifecycle and checksum over a mapped file
 */

use super::common::{memprobe, run, run_json, stdout_of};
use memprobe::core::config::TMPDIR_ENV;
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_backing_file_removed_after_success() {
    let dir = TempDir::new().unwrap();
    let output = memprobe()
        .env(TMPDIR_ENV, dir.path())
        .args(["--json", "page-faults", "--anon-size-mb", "4", "--file-size-mb", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let file = &report["file_backed"];
    assert_eq!(file["backing_file_removed"], true);
    assert_eq!(file["pages_touched"], 512);
    assert_eq!(file["checksum"], file["expected_checksum"]);
    assert_eq!(report["anonymous"]["pages_touched"], 1024);
    assert!(!dir.path().join("pagefault_test").exists());
}

#[test]
#[serial]
fn test_rss_grows_across_anonymous_touch() {
    let report = run_json(&["page-faults", "--anon-size-mb", "32", "--file-size-mb", "1"]);
    let anon = &report["anonymous"];
    let before = anon["before"]["snapshot"]["vm_rss_kb"].as_u64().unwrap();
    let after = anon["after"]["snapshot"]["vm_rss_kb"].as_u64().unwrap();

    assert!(after >= before);
    assert!(anon["faults"]["minor"].as_u64().unwrap() > 0);
}

#[test]
#[serial]
fn test_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("explicit_backing");
    let report = run_json(&[
        "page-faults",
        "--anon-size-mb",
        "1",
        "--file-size-mb",
        "1",
        "--path",
        path.to_str().unwrap(),
    ]);

    assert_eq!(report["file_backed"]["path"], path.to_str().unwrap());
    assert!(!path.exists());
}

#[test]
fn test_unwritable_directory_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("pagefault_test");
    let output = run(&[
        "page-faults",
        "--anon-size-mb",
        "1",
        "--file-size-mb",
        "1",
        "--path",
        path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("Minor faults: allocation + access completed"));
    assert!(!path.exists());
}
