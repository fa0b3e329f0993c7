/*!
 * Reporting
 * Human-readable probe output, or a single JSON document per run
 */

use crate::memory::MemorySnapshot;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// A snapshot with the label it was reported under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSnapshot {
    pub label: String,
    pub snapshot: MemorySnapshot,
}

impl LabeledSnapshot {
    pub fn new(label: impl Into<String>, snapshot: MemorySnapshot) -> Self {
        Self {
            label: label.into(),
            snapshot,
        }
    }
}

/// Format one snapshot line
pub fn format_snapshot(label: &str, snapshot: &MemorySnapshot) -> String {
    format!(
        "{} - PID: {}, VmSize: {} KB, VmRSS: {} KB",
        label, snapshot.pid, snapshot.vm_size_kb, snapshot.vm_rss_kb
    )
}

/// Line-oriented writer for probe output
///
/// In JSON mode text lines are dropped and only [`Reporter::document`]
/// writes anything.
pub struct Reporter<W: Write> {
    out: W,
    json: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(self.out, "{}", text.as_ref())
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }

    pub fn snapshot(&mut self, labeled: &LabeledSnapshot) -> io::Result<()> {
        self.line(format_snapshot(&labeled.label, &labeled.snapshot))
    }

    /// Write `report` as pretty JSON (JSON mode only)
    pub fn document<T: Serialize>(&mut self, report: &T) -> serde_json::Result<()> {
        if !self.json {
            return Ok(());
        }
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out).map_err(serde_json::Error::io)
    }

    /// Flush buffered output; required before fork(2)
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
