/*!
 * memprobe
 * Memory-behavior probes exposed as a library
 *
 * - Copy-on-write after fork
 * - Minor vs. major page faults
 * - Thrashing with cooperative shutdown
 * - TLB locality
 * - Offline page replacement simulation
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod probes;
pub mod replacement;
pub mod report;
pub mod signals;

// Re-exports
pub use crate::core::{ProbeConfig, ProbeError, ProbeResult};
pub use memory::{MemorySnapshot, ProcStatusReader, SnapshotError, SnapshotProvider};
pub use monitoring::init_tracing;
pub use probes::{execute, Probe};
pub use report::Reporter;
