/*!
 * Shared helpers for driving the memprobe binary
 */

use serde_json::Value;
use std::process::{Command, Output};

pub fn memprobe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_memprobe"));
    cmd.env("RUST_LOG", "off");
    cmd
}

pub fn run(args: &[&str]) -> Output {
    memprobe().args(args).output().expect("failed to spawn memprobe")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Run with `--json` and parse the single report document
pub fn run_json(args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run(&full);
    assert!(
        output.status.success(),
        "memprobe {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not a single JSON document")
}
