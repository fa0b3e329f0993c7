/*!
 * Monitoring
 * Structured tracing for probe runs
 */

mod tracer;

pub use tracer::{generate_run_id, init_tracing, span_probe, ProbeSpan, TRACE_JSON_ENV};
