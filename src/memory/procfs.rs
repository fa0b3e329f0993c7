/*!
 * Procfs Snapshot Reader
 * Parses VmSize/VmRSS from /proc/<pid>/status
 */

use super::traits::SnapshotProvider;
use super::types::*;
use crate::core::types::{Kilobytes, Pid};
use std::path::{Path, PathBuf};
use tracing::trace;

const VM_SIZE_KEY: &str = "VmSize:";
const VM_RSS_KEY: &str = "VmRSS:";

/// Snapshot provider backed by a procfs mount
#[derive(Debug, Clone)]
pub struct ProcStatusReader {
    root: PathBuf,
}

impl ProcStatusReader {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Read from an alternate procfs root (tests point this at a temp dir)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn status_path(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string()).join("status")
    }
}

impl Default for ProcStatusReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for ProcStatusReader {
    fn snapshot(&self, pid: Pid) -> SnapshotResult<MemorySnapshot> {
        let path = self.status_path(pid);
        let text = std::fs::read_to_string(&path)
            .map_err(|source| SnapshotError::Unavailable { path, source })?;
        let (vm_size_kb, vm_rss_kb) = parse_status(&text)?;
        trace!(pid, vm_size_kb, vm_rss_kb, "read process status");
        Ok(MemorySnapshot::new(pid, vm_size_kb, vm_rss_kb))
    }
}

/// Extract `(VmSize, VmRSS)` in kB from status text
///
/// Absent fields read as zero (kernel threads have neither).
pub fn parse_status(text: &str) -> SnapshotResult<(Kilobytes, Kilobytes)> {
    let mut vm_size = 0;
    let mut vm_rss = 0;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(VM_SIZE_KEY) {
            vm_size = parse_kb("VmSize", rest)?;
        } else if let Some(rest) = line.strip_prefix(VM_RSS_KEY) {
            vm_rss = parse_kb("VmRSS", rest)?;
        }
    }

    Ok((vm_size, vm_rss))
}

fn parse_kb(field: &'static str, rest: &str) -> SnapshotResult<Kilobytes> {
    let value = rest.split_whitespace().next().unwrap_or_default();
    value.parse().map_err(|_| SnapshotError::Malformed {
        field,
        value: rest.trim().to_string(),
    })
}
