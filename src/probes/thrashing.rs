/*!
 * Thrashing Probe
 *
 * Repeatedly dirties one byte per page of a buffer meant to exceed free
 * memory, forcing the kernel to keep evicting and reloading pages. Runs
 * until SIGINT (or an optional pass limit); the stop flag is polled before
 * every page write.
 */

use super::Probe;
use crate::core::config::{require_nonzero, ProbeConfig};
use crate::core::limits::THRASH_BUFFER_MB;
use crate::core::types::{mib, ProbeResult, Size};
use crate::memory::AnonRegion;
use crate::report::Reporter;
use crate::signals::{Cancellation, StopSignal};
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

/// Thrashing probe settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrashSettings {
    pub buffer_bytes: Size,
    /// Stop after this many full passes even without a signal
    pub max_passes: Option<u64>,
}

impl Default for ThrashSettings {
    fn default() -> Self {
        Self {
            buffer_bytes: mib(THRASH_BUFFER_MB),
            max_passes: None,
        }
    }
}

/// Counters from one thrash loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrashOutcome {
    /// Full passes completed (a pass interrupted midway is not counted)
    pub passes: u64,
    pub pages_touched: u64,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrashReport {
    pub buffer_bytes: Size,
    #[serde(flatten)]
    pub outcome: ThrashOutcome,
}

/// Touch one byte per page of `buf` until cancelled or `max_passes` reached
pub fn thrash_loop<C: Cancellation>(
    buf: &mut [u8],
    page_size: Size,
    cancel: &C,
    max_passes: Option<u64>,
) -> ThrashOutcome {
    let mut outcome = ThrashOutcome::default();
    if page_size == 0 || buf.is_empty() {
        outcome.cancelled = cancel.is_cancelled();
        return outcome;
    }

    'passes: while max_passes.map_or(true, |limit| outcome.passes < limit) {
        for chunk in buf.chunks_mut(page_size) {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break 'passes;
            }
            chunk[0] = 1;
            outcome.pages_touched += 1;
        }
        outcome.passes += 1;
    }

    outcome
}

pub struct ThrashProbe {
    config: ProbeConfig,
    settings: ThrashSettings,
}

impl ThrashProbe {
    pub fn new(config: ProbeConfig, settings: ThrashSettings) -> Self {
        Self { config, settings }
    }
}

impl Probe for ThrashProbe {
    type Report = ThrashReport;

    fn name(&self) -> &'static str {
        "thrash"
    }

    fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<ThrashReport> {
        self.config.validate()?;
        require_nonzero("buffer size", self.settings.buffer_bytes)?;

        // Handler goes in before the banner: once the banner is visible,
        // Ctrl+C is always a cooperative stop.
        let stop = StopSignal::install(Signal::SIGINT)?;
        reporter.line("Thrashing Demo - Press Ctrl+C to stop")?;
        reporter.flush()?;

        let mut region = AnonRegion::allocate(self.settings.buffer_bytes)?;
        let outcome = thrash_loop(
            region.as_mut_slice(),
            self.config.page_size,
            &stop,
            self.settings.max_passes,
        );
        drop(region);
        info!(passes = outcome.passes, cancelled = outcome.cancelled, "thrash loop finished");

        reporter.line("Thrashing demo stopped")?;
        reporter.line(format!("Completed passes: {}", outcome.passes))?;

        Ok(ThrashReport {
            buffer_bytes: self.settings.buffer_bytes,
            outcome,
        })
    }
}
