/*!
 * Anonymous Memory Regions
 * Private anonymous mappings used as probe buffers
 *
 * A region is mapped with mmap(2) rather than the global allocator so that
 * an oversized request surfaces as ENOMEM instead of aborting the process.
 */

use crate::core::errors::ProbeError;
use crate::core::types::{ProbeResult, Size};
use nix::errno::Errno;
use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use tracing::{debug, error};

/// Private read/write anonymous mapping, unmapped on drop
///
/// After fork(2) the child inherits the mapping copy-on-write.
#[derive(Debug)]
pub struct AnonRegion {
    ptr: NonNull<u8>,
    len: Size,
}

impl AnonRegion {
    /// Map `len` bytes of zeroed anonymous memory
    pub fn allocate(len: Size) -> ProbeResult<Self> {
        let length = NonZeroUsize::new(len).ok_or(ProbeError::Allocation {
            size: len,
            source: Errno::EINVAL,
        })?;

        // SAFETY: fresh mapping at a kernel-chosen address, no aliasing.
        let ptr = unsafe {
            mmap_anonymous(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_PRIVATE,
            )
        }
        .map_err(|source| ProbeError::Allocation { size: len, source })?;

        debug!(len, addr = ?ptr, "anonymous region mapped");
        Ok(Self {
            ptr: ptr.cast(),
            len,
        })
    }

    #[inline]
    pub fn len(&self) -> Size {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for len bytes for the lifetime of self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid for len bytes and &mut self is exclusive.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Write `byte` to every byte, committing all backing pages
    pub fn fill(&mut self, byte: u8) {
        self.as_mut_slice().fill(byte);
    }

    /// Write `byte` once per page; returns pages touched
    pub fn touch_pages(&mut self, page_size: Size, byte: u8) -> usize {
        touch_pages(self.as_mut_slice(), page_size, byte)
    }

    /// True when every byte equals `byte`
    pub fn holds_only(&self, byte: u8) -> bool {
        self.as_slice().iter().all(|&b| b == byte)
    }
}

impl Drop for AnonRegion {
    fn drop(&mut self) {
        // SAFETY: ptr/len came from a successful mmap and are unmapped once.
        if let Err(e) = unsafe { munmap(self.ptr.cast(), self.len) } {
            error!(len = self.len, error = %e, "munmap of anonymous region failed");
        }
    }
}

/// Write `byte` at the start of each page of `buf`; returns pages touched
pub fn touch_pages(buf: &mut [u8], page_size: Size, byte: u8) -> usize {
    if page_size == 0 {
        return 0;
    }
    let mut touched = 0;
    for chunk in buf.chunks_mut(page_size) {
        chunk[0] = byte;
        touched += 1;
    }
    touched
}

/// Wrapping sum of the first byte of each page of `buf`
pub fn page_checksum(buf: &[u8], page_size: Size) -> u8 {
    if page_size == 0 {
        return 0;
    }
    buf.chunks(page_size)
        .fold(0u8, |sum, chunk| sum.wrapping_add(std::hint::black_box(chunk[0])))
}

/// Checksum a uniformly filled buffer of `pages` pages produces
pub fn expected_checksum(pattern: u8, pages: usize) -> u8 {
    ((u64::from(pattern) * pages as u64) % 256) as u8
}
