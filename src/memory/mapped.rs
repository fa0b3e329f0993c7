/*!
 * File-Backed Mappings
 * Transient backing files and private read-only mappings over them
 *
 * Drop order releases resources in reverse: the mapping is unmapped, then
 * the descriptor closed, then the file unlinked. The file is removed on
 * every path, including a failed fill or a failed mmap.
 */

use super::region::page_checksum;
use crate::core::errors::ProbeError;
use crate::core::types::{ProbeResult, Size};
use nix::errno::Errno;
use nix::fcntl::{posix_fadvise, PosixFadviseAdvice};
use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tracing::{debug, error, warn};

/// A pattern-filled file that is removed when dropped
#[derive(Debug)]
pub struct BackingFile {
    path: PathBuf,
    file: Option<File>,
    len: Size,
}

impl BackingFile {
    /// Create or truncate `path`, write `len` bytes of `pattern` in
    /// `chunk`-sized writes, and flush to durable storage
    pub fn create(path: impl Into<PathBuf>, len: Size, pattern: u8, chunk: Size) -> ProbeResult<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&path)
            .map_err(|source| ProbeError::BackingFile {
                path: path.clone(),
                source,
            })?;

        // Guard exists from here on; any early return removes the file.
        let mut backing = Self {
            path,
            file: Some(file),
            len: 0,
        };
        backing.fill(len, pattern, chunk.max(1))?;
        debug!(path = %backing.path.display(), len, "backing file written and synced");

        // Advisory only: on failure the first touches hit the page cache.
        if let Err(e) = backing.evict_from_cache() {
            warn!(path = %backing.path.display(), error = %e, "could not drop cached pages");
        }
        Ok(backing)
    }

    /// Ask the kernel to drop this file's clean pages from the page cache,
    /// so the next access through a mapping has to read from storage
    pub fn evict_from_cache(&self) -> ProbeResult<()> {
        let file = self.file.as_ref().ok_or_else(|| ProbeError::BackingFile {
            path: self.path.clone(),
            source: std::io::Error::new(ErrorKind::Other, "file already closed"),
        })?;

        posix_fadvise(file.as_raw_fd(), 0, 0, PosixFadviseAdvice::POSIX_FADV_DONTNEED).map_err(|errno| {
            ProbeError::BackingFile {
                path: self.path.clone(),
                source: std::io::Error::from(errno),
            }
        })?;
        debug!(path = %self.path.display(), "cached pages dropped");
        Ok(())
    }

    fn fill(&mut self, len: Size, pattern: u8, chunk: Size) -> ProbeResult<()> {
        let path = self.path.clone();
        let file = self.file.as_mut().ok_or_else(|| ProbeError::BackingFile {
            path: path.clone(),
            source: std::io::Error::new(ErrorKind::Other, "file already closed"),
        })?;

        let buffer = vec![pattern; chunk];
        let mut written = 0;
        while written < len {
            let n = chunk.min(len - written);
            file.write_all(&buffer[..n])
                .map_err(|source| ProbeError::BackingFile {
                    path: path.clone(),
                    source,
                })?;
            written += n;
        }
        file.sync_all()
            .map_err(|source| ProbeError::BackingFile { path, source })?;

        self.len = written;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Size {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Map the whole file private and read-only
    pub fn map_read_only(&self) -> ProbeResult<FileMapping<'_>> {
        let mapping_err = |source| ProbeError::Mapping {
            path: self.path.clone(),
            source,
        };
        let file = self.file.as_ref().ok_or_else(|| mapping_err(Errno::EBADF))?;
        let length = NonZeroUsize::new(self.len).ok_or_else(|| mapping_err(Errno::EINVAL))?;

        // SAFETY: the file outlives the mapping (lifetime tied to &self) and
        // the mapping is private and read-only, so no aliasing writes exist.
        let ptr = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ,
                MapFlags::MAP_PRIVATE,
                file,
                0,
            )
        }
        .map_err(mapping_err)?;

        debug!(path = %self.path.display(), len = self.len, addr = ?ptr, "file mapped");
        Ok(FileMapping {
            ptr: ptr.cast(),
            len: self.len,
            _file: PhantomData,
        })
    }
}

impl Drop for BackingFile {
    fn drop(&mut self) {
        drop(self.file.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "backing file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not remove backing file"),
        }
    }
}

/// Private read-only view of a [`BackingFile`], unmapped on drop
#[derive(Debug)]
pub struct FileMapping<'a> {
    ptr: NonNull<u8>,
    len: Size,
    _file: PhantomData<&'a BackingFile>,
}

impl FileMapping<'_> {
    pub fn len(&self) -> Size {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for len readable bytes while mapped.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Read one byte per page, faulting each page in from the file
    pub fn touch_checksum(&self, page_size: Size) -> u8 {
        page_checksum(self.as_slice(), page_size)
    }
}

impl Drop for FileMapping<'_> {
    fn drop(&mut self) {
        // SAFETY: ptr/len came from a successful mmap and are unmapped once.
        if let Err(e) = unsafe { munmap(self.ptr.cast(), self.len) } {
            error!(len = self.len, error = %e, "munmap of file mapping failed");
        }
    }
}
