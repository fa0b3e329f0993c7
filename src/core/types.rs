/*!
 * Core Types
 * Common types used across the probes
 */

/// Process ID type (OS pid as seen by procfs)
pub type Pid = i32;

/// Size type for memory operations (bytes)
pub type Size = usize;

/// Kibibyte quantity as reported by procfs
pub type Kilobytes = u64;

/// Common result type for probe operations
pub type ProbeResult<T> = Result<T, super::errors::ProbeError>;

/// Convert mebibytes to bytes, saturating on overflow
#[inline]
pub fn mib(n: usize) -> Size {
    n.saturating_mul(1024 * 1024)
}

/// Number of pages needed to cover `bytes` at the given page size
#[inline]
pub fn pages_in(bytes: Size, page_size: Size) -> usize {
    if page_size == 0 {
        return 0;
    }
    bytes.div_ceil(page_size)
}
