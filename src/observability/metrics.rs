//! OpenTelemetry metrics for populate runs.
//!
//! Key metrics:
//! - seedline_statements_total: Counter for processed statements
//! - seedline_statements_skipped_total: Counter for tolerated failures
//! - seedline_flushes_total: Counter for committed batches
//! - seedline_script_failures_total: Counter for scripts that aborted a run
//! - seedline_script_duration_seconds: Histogram for per-script wall time

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::metrics::{ManualReader, SdkMeterProvider};
use std::sync::OnceLock;

/// Global metrics instance.
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Seedline metrics registry.
#[derive(Debug)]
pub struct Metrics {
    /// Statements processed, skipped ones included.
    pub statements_total: Counter<u64>,
    /// Failed statements tolerated by the error policy.
    pub statements_skipped: Counter<u64>,
    /// Batches executed and committed.
    pub flushes_total: Counter<u64>,
    /// Scripts that ended a run with a fatal error.
    pub script_failures: Counter<u64>,
    /// Histogram of script execution time in seconds.
    pub script_duration: Histogram<f64>,
}

impl Metrics {
    /// Create a new metrics registry from a meter.
    fn new(meter: &Meter) -> Self {
        Self {
            statements_total: meter
                .u64_counter("seedline_statements_total")
                .with_description("Total number of SQL statements processed")
                .with_unit("1")
                .init(),
            statements_skipped: meter
                .u64_counter("seedline_statements_skipped_total")
                .with_description("Failed statements skipped by the error policy")
                .with_unit("1")
                .init(),
            flushes_total: meter
                .u64_counter("seedline_flushes_total")
                .with_description("Statement batches executed and committed")
                .with_unit("1")
                .init(),
            script_failures: meter
                .u64_counter("seedline_script_failures_total")
                .with_description("Scripts that stopped a populate run")
                .with_unit("1")
                .init(),
            script_duration: meter
                .f64_histogram("seedline_script_duration_seconds")
                .with_description("Wall-clock time to execute one SQL script")
                .with_unit("s")
                .init(),
        }
    }
}

/// Initialize the metrics system.
///
/// Metrics are recorded against a manual reader and are not exported.
/// This should be called once at startup. Subsequent calls are ignored.
pub fn init_metrics() {
    METRICS.get_or_init(|| {
        let reader = ManualReader::builder().build();
        let provider = SdkMeterProvider::builder().with_reader(reader).build();
        global::set_meter_provider(provider);

        let meter = global::meter("seedline");
        Metrics::new(&meter)
    });
}

/// Get the global metrics instance, if initialized.
pub fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

/// Record a completed script.
pub fn record_script(
    script: &str,
    duration_seconds: f64,
    statements: usize,
    skipped: usize,
    flushes: usize,
) {
    if let Some(m) = METRICS.get() {
        let attrs = [KeyValue::new("script", script.to_string())];
        m.statements_total.add(statements as u64, &attrs);
        m.statements_skipped.add(skipped as u64, &attrs);
        m.flushes_total.add(flushes as u64, &attrs);
        m.script_duration.record(duration_seconds, &attrs);
    }
}

/// Record a script that ended its run with a fatal error.
pub fn record_script_failure(script: &str) {
    if let Some(m) = METRICS.get() {
        m.script_failures
            .add(1, &[KeyValue::new("script", script.to_string())]);
    }
}
