/*!
 * Probes
 * One-shot memory-behavior demonstrations
 *
 * Each probe follows the same shape: allocate, measure, trigger, measure,
 * release. Probes share no state with each other.
 */

pub mod cow;
pub mod page_faults;
pub mod simulate;
pub mod thrashing;
pub mod tlb;

pub use cow::{CowProbe, CowReport, CowSettings};
pub use page_faults::{PageFaultProbe, PageFaultReport, PageFaultSettings};
pub use simulate::{SimulateProbe, SimulateReport, SimulateSettings};
pub use thrashing::{thrash_loop, ThrashOutcome, ThrashProbe, ThrashReport, ThrashSettings};
pub use tlb::{AccessPattern, TlbProbe, TlbReport, TlbSettings};

use crate::core::types::ProbeResult;
use crate::monitoring::span_probe;
use crate::report::Reporter;
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// A runnable probe producing a serializable report
pub trait Probe {
    type Report: Serialize;

    /// Subcommand name, also used as the tracing span name
    fn name(&self) -> &'static str;

    /// Run to completion, writing progress to `reporter`
    fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<Self::Report>;
}

/// Run `probe` inside a span and emit its JSON report when requested
///
/// Every resource the probe acquired has been released by the time this
/// returns, on both the success and the error path.
pub fn execute<P: Probe, W: Write>(probe: &P, reporter: &mut Reporter<W>) -> ProbeResult<P::Report> {
    let span = span_probe(probe.name());
    let outcome = {
        let _entered = span.enter();
        probe.run(reporter)
    };

    match outcome {
        Ok(report) => {
            span.record_result(true);
            reporter.document(&report)?;
            reporter.flush()?;
            Ok(report)
        }
        Err(e) => {
            span.record_error(&e.to_string());
            debug!(probe = probe.name(), error = %e, "probe failed");
            // Best effort: progress printed before the failure should still appear
            let _ = reporter.flush();
            Err(e)
        }
    }
}
