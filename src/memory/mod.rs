/*!
 * Memory Module
 * Process memory introspection and probe buffers
 */

pub mod faults;
pub mod mapped;
pub mod procfs;
pub mod region;
pub mod traits;
pub mod types;

// Re-export public API
pub use faults::{fault_counters_or_zero, read_fault_counters};
pub use mapped::{BackingFile, FileMapping};
pub use procfs::{parse_status, ProcStatusReader};
pub use region::{expected_checksum, page_checksum, touch_pages, AnonRegion};
pub use traits::{current_pid, SnapshotProvider};
pub use types::*;
