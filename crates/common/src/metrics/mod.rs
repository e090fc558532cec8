//! Metrics and observability utilities
//!
//! Exposes extraction metrics through the `metrics` facade. No exporter is
//! installed here; the embedding process decides where they go.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Routine metrics
pub const METRICS_PREFIX: &str = "routine";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_extractions_total", METRICS_PREFIX),
        Unit::Count,
        "Total successful extractions by method"
    );

    describe_counter!(
        format!("{}_extraction_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed extractions by reason"
    );

    describe_histogram!(
        format!("{}_extraction_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end extraction latency in seconds"
    );

    describe_gauge!(
        format!("{}_extraction_confidence", METRICS_PREFIX),
        Unit::Count,
        "Confidence score of the latest extraction"
    );

    describe_counter!(
        format!("{}_document_service_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Document service calls that failed or timed out"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time one extraction request
pub struct ExtractionTimer {
    start: Instant,
}

impl ExtractionTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Record a successful extraction
    pub fn success(self, method: &str, confidence: u8) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_extractions_total", METRICS_PREFIX),
            "method" => method.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_extraction_duration_seconds", METRICS_PREFIX),
            "outcome" => "success"
        )
        .record(duration);

        gauge!(format!("{}_extraction_confidence", METRICS_PREFIX)).set(confidence as f64);
    }

    /// Record a failed extraction
    pub fn failure(self, reason: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_extraction_failures_total", METRICS_PREFIX),
            "reason" => reason.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_extraction_duration_seconds", METRICS_PREFIX),
            "outcome" => "failure"
        )
        .record(duration);
    }
}

/// Helper to record a document service failure
pub fn record_document_service_error(service: &str) {
    counter!(
        format!("{}_document_service_errors_total", METRICS_PREFIX),
        "service" => service.to_string()
    )
    .increment(1);
}
