/*!
 * Probe Limits and Constants
 *
 * Centralized location for sizes, fill patterns and iteration counts.
 * Organized by probe.
 *
 * - Values marked [LINUX-COMPAT] mirror kernel conventions
 * - Values marked [PERF] trade run time for a clearer signal
 */

// =============================================================================
// PAGES
// =============================================================================

/// Page granularity used when touching buffers (4KB)
/// [LINUX-COMPAT] Base page size on x86_64 and most aarch64 kernels
pub const PAGE_SIZE: usize = 4 * 1024;

/// Byte written when a buffer is first filled
pub const FILL_BYTE: u8 = b'A';

/// Byte the COW child writes to diverge pages
pub const COW_WRITE_BYTE: u8 = b'B';

// =============================================================================
// COPY-ON-WRITE PROBE
// =============================================================================

/// Shared buffer size for the fork probe (10MB)
pub const COW_BUFFER_MB: usize = 10;

// =============================================================================
// PAGE FAULT PROBE
// =============================================================================

/// Anonymous buffer for minor faults (100MB)
pub const MINOR_FAULT_BUFFER_MB: usize = 100;

/// Backing file size for major faults (10MB)
pub const MAJOR_FAULT_FILE_MB: usize = 10;

/// Backing file name, created under the configured temp directory
pub const BACKING_FILE_NAME: &str = "pagefault_test";

/// Write chunk used when filling the backing file
pub const FILE_WRITE_CHUNK: usize = PAGE_SIZE;

// =============================================================================
// THRASHING PROBE
// =============================================================================

/// Oversubscribed buffer size (500MB)
pub const THRASH_BUFFER_MB: usize = 500;

// =============================================================================
// TLB PROBE
// =============================================================================

/// Element count of the i32 array (64M elements, 256MB)
pub const TLB_ARRAY_ELEMENTS: usize = 64 * 1024 * 1024;

/// Full passes over the array in the sequential test
/// [PERF] Enough passes to dominate timer resolution
pub const SEQUENTIAL_ITERATIONS: usize = 100;

/// Reads performed by the random test
pub const RANDOM_ACCESSES: usize = 1_000_000;

/// Seed for random index generation, fixed so runs are comparable
pub const RANDOM_SEED: u64 = 42;

// =============================================================================
// PAGE REPLACEMENT SIMULATOR
// =============================================================================

/// Default simulated TLB entries
pub const DEFAULT_TLB_ENTRIES: usize = 4;

/// Simulated page size
pub const SIM_PAGE_SIZE: u64 = 4096;
