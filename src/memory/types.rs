/*!
 * Memory Types
 * Snapshots, fault counters and their errors
 */

use crate::core::types::{Kilobytes, Pid};
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Snapshot read result
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Failures reading process memory metadata
///
/// Never fatal: callers log these and continue with zeroed values.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("process metadata unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {field} value: {value:?}")]
    Malformed { field: &'static str, value: String },

    #[error("getrusage() failed: {0}")]
    Rusage(#[source] Errno),
}

/// Point-in-time virtual size and resident set size of one process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub pid: Pid,
    pub vm_size_kb: Kilobytes,
    pub vm_rss_kb: Kilobytes,
}

impl MemorySnapshot {
    pub fn new(pid: Pid, vm_size_kb: Kilobytes, vm_rss_kb: Kilobytes) -> Self {
        Self {
            pid,
            vm_size_kb,
            vm_rss_kb,
        }
    }

    /// Placeholder used when the metadata source could not be read
    pub fn zeroed(pid: Pid) -> Self {
        Self::new(pid, 0, 0)
    }

    /// Resident growth from `earlier` to `self` (negative when pages were released)
    pub fn rss_delta_kb(&self, earlier: &MemorySnapshot) -> i64 {
        let now = i64::try_from(self.vm_rss_kb).unwrap_or(i64::MAX);
        let then = i64::try_from(earlier.vm_rss_kb).unwrap_or(i64::MAX);
        now.saturating_sub(then)
    }
}

/// Page fault counters of the calling process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultCounters {
    /// Faults served without I/O
    pub minor: u64,
    /// Faults that required reading backing storage
    pub major: u64,
}

impl FaultCounters {
    pub fn new(minor: u64, major: u64) -> Self {
        Self { minor, major }
    }

    /// Counters accumulated since `earlier`
    pub fn since(&self, earlier: &FaultCounters) -> FaultCounters {
        FaultCounters {
            minor: self.minor.saturating_sub(earlier.minor),
            major: self.major.saturating_sub(earlier.major),
        }
    }
}
