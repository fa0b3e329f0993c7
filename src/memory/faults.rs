/*!
 * Page Fault Counters
 * Minor/major fault totals of the calling process via getrusage(2)
 */

use super::types::*;
use nix::sys::resource::{getrusage, UsageWho};

/// Read the calling process's cumulative fault counters
pub fn read_fault_counters() -> SnapshotResult<FaultCounters> {
    let usage = getrusage(UsageWho::RUSAGE_SELF).map_err(SnapshotError::Rusage)?;
    Ok(FaultCounters::new(
        u64::try_from(usage.minor_page_faults()).unwrap_or(0),
        u64::try_from(usage.major_page_faults()).unwrap_or(0),
    ))
}

/// Best-effort variant; logs and returns zeros on failure
pub fn fault_counters_or_zero() -> FaultCounters {
    read_fault_counters().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "fault counters unavailable, reporting zeros");
        FaultCounters::default()
    })
}
