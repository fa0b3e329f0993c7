/*!
 * Copy-on-Write Probe
 *
 * Fills a private buffer, forks, and lets the child dirty one byte per page.
 * Parent and child share physical pages until the child writes; the
 * parent's view of the buffer never changes.
 *
 * The child reports its snapshots back over a pipe and leaves through
 * `_exit`, so it never returns into the parent's control flow.
 */

use super::Probe;
use crate::core::config::{require_nonzero, ProbeConfig};
use crate::core::errors::ProbeError;
use crate::core::limits::{COW_BUFFER_MB, COW_WRITE_BYTE};
use crate::core::types::{mib, Pid, ProbeResult, Size};
use crate::memory::{current_pid, AnonRegion, ProcStatusReader, SnapshotProvider};
use crate::report::{LabeledSnapshot, Reporter};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, pipe, ForkResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::OwnedFd;
use std::time::Duration;
use tracing::{debug, error, info};

/// COW probe settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CowSettings {
    pub buffer_bytes: Size,
    /// Optional diagnostic pause around the child's writes
    pub pause: Duration,
}

impl Default for CowSettings {
    fn default() -> Self {
        Self {
            buffer_bytes: mib(COW_BUFFER_MB),
            pause: Duration::ZERO,
        }
    }
}

/// What the child sends back to the parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildReport {
    pub pid: Pid,
    pub pages_written: usize,
    pub snapshots: Vec<LabeledSnapshot>,
}

/// Outcome of one COW run, from the parent's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CowReport {
    pub buffer_bytes: Size,
    pub parent_pid: Pid,
    pub child: ChildReport,
    /// Parent snapshots in the order they were taken
    pub snapshots: Vec<LabeledSnapshot>,
    /// Parent buffer still holds only the fill byte after the child wrote
    pub parent_intact: bool,
}

impl CowReport {
    /// Parent RSS change across the fork itself, in kB
    pub fn fork_rss_delta_kb(&self) -> Option<i64> {
        let before = self.snapshots.first()?;
        let after = self.snapshots.get(1)?;
        Some(after.snapshot.rss_delta_kb(&before.snapshot))
    }
}

pub struct CowProbe<P: SnapshotProvider = ProcStatusReader> {
    config: ProbeConfig,
    settings: CowSettings,
    provider: P,
}

impl CowProbe<ProcStatusReader> {
    pub fn new(config: ProbeConfig, settings: CowSettings) -> Self {
        Self::with_provider(config, settings, ProcStatusReader::new())
    }
}

impl<P: SnapshotProvider> CowProbe<P> {
    pub fn with_provider(config: ProbeConfig, settings: CowSettings, provider: P) -> Self {
        Self {
            config,
            settings,
            provider,
        }
    }

    fn measure<W: Write>(&self, reporter: &mut Reporter<W>, label: &str) -> ProbeResult<LabeledSnapshot> {
        let labeled = LabeledSnapshot::new(label, self.provider.snapshot_or_zero());
        reporter.snapshot(&labeled)?;
        Ok(labeled)
    }

    fn pause(&self) {
        if !self.settings.pause.is_zero() {
            std::thread::sleep(self.settings.pause);
        }
    }

    fn run_child<W: Write>(
        &self,
        region: &mut AnonRegion,
        reporter: &mut Reporter<W>,
        channel: OwnedFd,
    ) -> ProbeResult<()> {
        let pid = current_pid();
        reporter.blank()?;
        reporter.line(format!("=== Child Process (PID: {}) ===", pid))?;
        let mut snapshots = vec![self.measure(reporter, "Child after fork (before COW)")?];

        self.pause();

        reporter.line("Child: Writing to trigger COW...")?;
        let pages_written = region.touch_pages(self.config.page_size, COW_WRITE_BYTE);
        snapshots.push(self.measure(reporter, "Child after COW writes")?);

        self.pause();

        reporter.line("Child: COW triggered")?;
        reporter.flush()?;

        let report = ChildReport {
            pid,
            pages_written,
            snapshots,
        };
        let mut channel = File::from(channel);
        serde_json::to_writer(&mut channel, &report)?;
        channel.flush()?;
        Ok(())
    }

    fn run_parent<W: Write>(
        &self,
        region: &AnonRegion,
        reporter: &mut Reporter<W>,
        child: nix::unistd::Pid,
        channel: OwnedFd,
        mut snapshots: Vec<LabeledSnapshot>,
    ) -> ProbeResult<CowReport> {
        reporter.blank()?;
        reporter.line(format!("=== Parent Process (PID: {}) ===", current_pid()))?;
        reporter.line(format!("Child PID: {}", child))?;
        snapshots.push(self.measure(reporter, "Parent after fork (sharing memory)")?);

        self.pause();

        // Drain to EOF first, then reap; the child closes its end on exit.
        let mut payload = String::new();
        let read = File::from(channel).read_to_string(&mut payload);

        let status = waitpid(child, None).map_err(ProbeError::Wait)?;
        debug!(?status, "child reaped");
        match status {
            WaitStatus::Exited(_, 0) => {}
            WaitStatus::Exited(_, code) => {
                return Err(ProbeError::ChildFailed(format!("exited with status {}", code)));
            }
            WaitStatus::Signaled(_, signal, _) => {
                return Err(ProbeError::ChildFailed(format!("killed by {}", signal)));
            }
            other => {
                return Err(ProbeError::ChildFailed(format!("unexpected wait status {:?}", other)));
            }
        }

        read.map_err(|e| ProbeError::ChildFailed(format!("reading child report: {}", e)))?;
        let child_report: ChildReport = serde_json::from_str(&payload)
            .map_err(|e| ProbeError::ChildFailed(format!("decoding child report: {}", e)))?;

        snapshots.push(self.measure(reporter, "Parent after child completes")?);

        let parent_intact = region.holds_only(self.config.fill_byte);
        reporter.line(format!(
            "Parent buffer unchanged after child writes: {}",
            if parent_intact { "yes" } else { "no" }
        ))?;
        reporter.line("COW demonstration complete")?;

        Ok(CowReport {
            buffer_bytes: region.len(),
            parent_pid: current_pid(),
            child: child_report,
            snapshots,
            parent_intact,
        })
    }
}

impl<P: SnapshotProvider> Probe for CowProbe<P> {
    type Report = CowReport;

    fn name(&self) -> &'static str {
        "cow"
    }

    fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<CowReport> {
        self.config.validate()?;
        require_nonzero("buffer size", self.settings.buffer_bytes)?;

        reporter.line("Copy-On-Write Demonstration")?;

        let mut region = AnonRegion::allocate(self.settings.buffer_bytes)?;
        region.fill(self.config.fill_byte);
        reporter.line(format!(
            "Parent allocated {} MB",
            self.settings.buffer_bytes / mib(1)
        ))?;

        let snapshots = vec![self.measure(reporter, "Parent before fork")?];

        // Unflushed output would be duplicated into the child.
        reporter.flush()?;
        let (read_end, write_end) = pipe().map_err(ProbeError::Pipe)?;

        // SAFETY: the binary is single-threaded; the child only touches its
        // copy of the region, writes to stdout and the pipe, then _exits.
        match unsafe { fork() }.map_err(ProbeError::Fork)? {
            ForkResult::Child => {
                drop(read_end);
                let code = match self.run_child(&mut region, reporter, write_end) {
                    Ok(()) => 0,
                    Err(e) => {
                        error!(error = %e, "child failed");
                        1
                    }
                };
                let _ = reporter.flush();
                // SAFETY: skips atexit handlers and destructors the child
                // shares with the parent; nothing else runs after this.
                unsafe { nix::libc::_exit(code) }
            }
            ForkResult::Parent { child } => {
                drop(write_end);
                info!(child = child.as_raw(), "forked child");
                self.run_parent(&region, reporter, child, read_end, snapshots)
            }
        }
    }
}
