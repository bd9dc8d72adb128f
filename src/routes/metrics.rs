//! Prometheus metrics endpoint
//!
//! Exposes session counters and durations in Prometheus format.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize metrics (call once at startup)
///
/// Fails if another global recorder is already installed.
pub fn init_metrics() -> anyhow::Result<()> {
    PROMETHEUS_HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;
    register_metrics();
    Ok(())
}

fn register_metrics() {
    metrics::describe_counter!(
        "gateway_sessions_total",
        "Streaming chat sessions by provider and outcome"
    );
    metrics::describe_counter!(
        "gateway_chunks_total",
        "Text chunks written to clients"
    );
    metrics::describe_histogram!(
        "gateway_session_duration_seconds",
        "Time from request to session end in seconds"
    );
    metrics::describe_counter!(
        "gateway_open_failures_total",
        "Upstream streams that failed to open"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record a finished session
pub fn record_session(provider: &str, outcome: &str, chunks: u64, duration_secs: f64) {
    metrics::counter!(
        "gateway_sessions_total",
        "provider" => provider.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::counter!("gateway_chunks_total", "provider" => provider.to_string())
        .increment(chunks);
    metrics::histogram!("gateway_session_duration_seconds", "provider" => provider.to_string())
        .record(duration_secs);
}

/// Record an upstream stream that never opened
pub fn record_open_failure(provider: &str) {
    metrics::counter!("gateway_open_failures_total", "provider" => provider.to_string())
        .increment(1);
}
