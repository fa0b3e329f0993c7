/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use nix::errno::Errno;
use std::path::PathBuf;
use thiserror::Error;

// Re-export SnapshotError from memory module
pub use crate::memory::SnapshotError;

/// Fatal probe errors
///
/// Every variant ends the run with exit status 1. Snapshot failures are
/// not represented here: they are logged and replaced by a zeroed snapshot.
#[derive(Error, Debug, Diagnostic)]
pub enum ProbeError {
    #[error("Allocation of {size} bytes failed: {source}")]
    #[diagnostic(
        code(probe::allocation_failed),
        help("Request a smaller buffer or free memory before rerunning.")
    )]
    Allocation {
        size: usize,
        #[source]
        source: Errno,
    },

    #[error("Backing file {} failed: {source}", path.display())]
    #[diagnostic(
        code(probe::backing_file),
        help("Check that the temp directory exists and is writable (MEMPROBE_TMPDIR).")
    )]
    BackingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Mapping {} failed: {source}", path.display())]
    #[diagnostic(
        code(probe::mapping_failed),
        help("The file may be empty or the address space exhausted.")
    )]
    Mapping {
        path: PathBuf,
        #[source]
        source: Errno,
    },

    #[error("fork() failed: {0}")]
    #[diagnostic(
        code(probe::fork_failed),
        help("Process limit reached or not enough memory to duplicate page tables.")
    )]
    Fork(#[source] Errno),

    #[error("pipe() failed: {0}")]
    #[diagnostic(code(probe::pipe_failed), help("File descriptor limit may be exhausted."))]
    Pipe(#[source] Errno),

    #[error("waitpid() failed: {0}")]
    #[diagnostic(code(probe::wait_failed))]
    Wait(#[source] Errno),

    #[error("Child process failed: {0}")]
    #[diagnostic(code(probe::child_failed))]
    ChildFailed(String),

    #[error("Installing signal handler failed: {0}")]
    #[diagnostic(code(probe::signal_failed))]
    Signal(#[source] Errno),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(probe::invalid_config),
        help("Sizes, frame counts and iteration counts must be greater than zero.")
    )]
    InvalidConfig(String),

    #[error("Writing report failed: {0}")]
    #[diagnostic(code(probe::report_io))]
    Report(#[from] std::io::Error),

    #[error("Serializing report failed: {0}")]
    #[diagnostic(code(probe::serialization))]
    Serialization(#[from] serde_json::Error),
}
