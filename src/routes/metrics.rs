//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "token_usage_reports_total",
        "Usage reports received, by outcome (created, updated, failed)"
    );
    metrics::describe_counter!(
        "token_usage_queries_total",
        "Usage queries answered, by kind and result"
    );
    metrics::describe_histogram!(
        "token_usage_request_duration_seconds",
        "Handler duration in seconds, by operation"
    );
}

/// Prometheus metrics endpoint handler
///
/// Returns metrics in Prometheus text format for scraping.
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a usage report outcome
pub fn record_report(outcome: &str) {
    metrics::counter!("token_usage_reports_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record an answered query
pub fn record_query(kind: &str, result: &str) {
    metrics::counter!(
        "token_usage_queries_total",
        "kind" => kind.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

pub fn record_duration(operation: &str, duration_secs: f64) {
    metrics::histogram!(
        "token_usage_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}
