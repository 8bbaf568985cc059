//! Metrics and observability utilities
//!
//! Prometheus metric registration with standardized naming.

use metrics::{describe_counter, describe_histogram, Unit};

/// Metrics prefix for all journal metrics
pub const METRICS_PREFIX: &str = "journal";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_article_views_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of recorded article views"
    );

    describe_counter!(
        format!("{}_citation_syncs_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of completed citation sync attempts"
    );

    describe_counter!(
        format!("{}_join_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of accepted mailing-list join requests"
    );
}
