/*!
 * Probe Tracing
 * Structured diagnostics for probe runs using the tracing crate
 *
 * Diagnostics go to stderr so stdout carries only the probe report.
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Environment variable enabling JSON log lines
pub const TRACE_JSON_ENV: &str = "MEMPROBE_TRACE_JSON";

/// Runs slower than this are logged at warn
const SLOW_PROBE: Duration = Duration::from_secs(30);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: warn)
/// - MEMPROBE_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    // try_init: a second call (e.g. from tests) keeps the first subscriber
    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!(json = use_json, "tracing initialized");
    }
}

/// Generate a unique id for correlating one probe run
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering a single probe run; logs its duration on drop
pub struct ProbeSpan {
    span: tracing::Span,
    start: Instant,
    probe: String,
    run_id: String,
}

impl ProbeSpan {
    pub fn new(probe: &str) -> Self {
        let run_id = generate_run_id();

        let span = span!(
            Level::INFO,
            "probe",
            run_id = %run_id,
            probe = probe,
            duration_ms = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        let _entered = span.enter();
        info!(probe = probe, "probe started");
        drop(_entered);

        Self {
            span,
            start: Instant::now(),
            probe: probe.to_string(),
            run_id,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "error" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for ProbeSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_ms", duration.as_millis() as u64);

        if duration > SLOW_PROBE {
            warn!(
                run_id = %self.run_id,
                probe = %self.probe,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow probe run"
            );
        } else {
            debug!(
                run_id = %self.run_id,
                probe = %self.probe,
                duration_ms = duration.as_millis() as u64,
                "probe completed"
            );
        }
    }
}

/// Helper to open a span for a probe run
#[inline]
pub fn span_probe(name: &str) -> ProbeSpan {
    ProbeSpan::new(name)
}
