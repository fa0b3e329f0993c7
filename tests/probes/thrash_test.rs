/*!
 * Thrashing Probe Tests
 * Cooperative stop on SIGINT and the pass limit
 */

use super::common::{memprobe, run_json};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::{BufRead, BufReader, Read};
use std::process::Stdio;

#[test]
#[serial]
fn test_sigint_stops_cleanly() {
    let mut child = memprobe()
        .args(["thrash", "--size-mb", "8"])
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut banner = String::new();
    stdout.read_line(&mut banner).unwrap();
    assert_eq!(banner.trim_end(), "Thrashing Demo - Press Ctrl+C to stop");

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    let status = child.wait().unwrap();

    assert!(status.success(), "thrash exited with {:?}", status);
    assert!(rest.contains("Thrashing demo stopped"));
    assert!(rest.contains("Completed passes: "));
}

#[test]
#[serial]
fn test_pass_limit_without_signal() {
    let report = run_json(&["thrash", "--size-mb", "2", "--max-passes", "3"]);

    assert_eq!(report["passes"], 3);
    assert_eq!(report["pages_touched"], 3 * 512);
    assert_eq!(report["cancelled"], false);
}
