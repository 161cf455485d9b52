//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the artdump server:
//! - HTTP request metrics (latency, counts)
//! - Service loop status (collected dynamically)
//! - Core run metrics, registered from `artdump_core::metrics`

use artdump_core::ServiceStatus;
use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "artdump_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("artdump_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "artdump_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Service Metrics (collected dynamically)
// =============================================================================

/// Service busy state (1 = signalled or processing, 0 = idle).
pub static SERVICE_BUSY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "artdump_service_busy",
        "Whether the service has a run pending or in progress",
    )
    .unwrap()
});

/// Recently added videos waiting for a run.
pub static RECENT_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "artdump_recent_items_queued",
        "Number of recently added videos waiting for a run",
    )
    .unwrap()
});

/// Progress of the active run in percent.
pub static RUN_PROGRESS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("artdump_run_progress_percent", "Progress of the active run")
        .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Service
    registry.register(Box::new(SERVICE_BUSY.clone())).unwrap();
    registry.register(Box::new(RECENT_QUEUED.clone())).unwrap();
    registry.register(Box::new(RUN_PROGRESS.clone())).unwrap();

    // Core metrics (fetch engine, runs, cache)
    for metric in artdump_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the service right now.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let snapshot = state.service().snapshot().await;
    SERVICE_BUSY.set(if snapshot.status == ServiceStatus::Idle { 0 } else { 1 });
    RECENT_QUEUED.set(snapshot.recent_queued as i64);
    RUN_PROGRESS.set(state.progress().percent as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    static NUMERIC: Lazy<regex_lite::Regex> =
        Lazy::new(|| regex_lite::Regex::new(r"/\d+(/|$)").unwrap());
    NUMERIC.replace_all(path, "/{id}$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/api/v1/items/12345"), "/api/v1/items/{id}");
        assert_eq!(
            normalize_path("/api/v1/items/12/art/3"),
            "/api/v1/items/{id}/art/{id}"
        );
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/runs/cancel"), "/api/v1/runs/cancel");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("artdump_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_service_and_core_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        SERVICE_BUSY.set(0);
        RECENT_QUEUED.set(0);
        artdump_core::metrics::ARTWORK_WRITTEN
            .with_label_values(&["movie"])
            .inc();
        artdump_core::metrics::CACHE_WARMED.inc();

        let output = encode_metrics();

        assert!(output.contains("artdump_http_request_duration_seconds"));
        assert!(output.contains("artdump_http_requests_in_flight"));
        assert!(output.contains("artdump_service_busy"));
        assert!(output.contains("artdump_recent_items_queued"));
        assert!(output.contains("artdump_artwork_written_total"));
        assert!(output.contains("artdump_cache_warmed_total"));
    }
}
