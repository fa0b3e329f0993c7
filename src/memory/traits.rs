/*!
 * Memory Traits
 * Process memory introspection abstraction
 */

use super::types::*;
use crate::core::types::Pid;
use tracing::warn;

/// Source of per-process memory sizes
///
/// Implementations may use procfs, an OS API, or anything else that yields
/// virtual and resident sizes in kilobytes.
pub trait SnapshotProvider {
    /// Read the snapshot of `pid`
    fn snapshot(&self, pid: Pid) -> SnapshotResult<MemorySnapshot>;

    /// Read the snapshot of the calling process
    fn snapshot_self(&self) -> SnapshotResult<MemorySnapshot> {
        self.snapshot(current_pid())
    }

    /// Best-effort read of the calling process; logs and zeroes on failure
    fn snapshot_or_zero(&self) -> MemorySnapshot {
        let pid = current_pid();
        match self.snapshot(pid) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(pid, error = %e, "memory snapshot unavailable, reporting zeros");
                MemorySnapshot::zeroed(pid)
            }
        }
    }
}

/// PID of the calling process (re-evaluated after fork)
pub fn current_pid() -> Pid {
    nix::unistd::getpid().as_raw()
}
