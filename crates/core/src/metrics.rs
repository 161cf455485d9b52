//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Fetch engine (artwork written, provider errors, breaker trips, write failures)
//! - Run orchestrator (entries processed, run duration)
//! - Local cache reconciler (entries warmed)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Fetch Engine Metrics
// =============================================================================

/// Artwork files written, by media type.
pub static ARTWORK_WRITTEN: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("artdump_artwork_written_total", "Total artwork files written"),
        &["media_type"],
    )
    .unwrap()
});

/// Provider errors by host.
pub static PROVIDER_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "artdump_provider_errors_total",
            "Total failed artwork fetches per provider host",
        ),
        &["host"],
    )
    .unwrap()
});

/// Hosts disabled by the circuit breaker.
pub static BREAKER_TRIPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "artdump_breaker_trips_total",
            "Times a provider host was disabled for the rest of a run",
        ),
        &["host"],
    )
    .unwrap()
});

/// Local file write failures.
pub static FILE_WRITE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "artdump_file_write_failures_total",
        "Total artwork file write failures",
    )
    .unwrap()
});

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Entries handled by runs, by outcome.
pub static ENTRIES_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("artdump_entries_processed_total", "Total entries handled by runs"),
        &["outcome"], // "processed", "excluded", "error"
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("artdump_run_duration_seconds", "Duration of artwork runs")
            .buckets(vec![1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0, 14400.0]),
        &["result"], // "completed", "aborted"
    )
    .unwrap()
});

// =============================================================================
// Cache Reconciler Metrics
// =============================================================================

/// Images primed into the host cache.
pub static CACHE_WARMED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "artdump_cache_warmed_total",
        "Total local images primed into the host image cache",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Fetch engine
        Box::new(ARTWORK_WRITTEN.clone()),
        Box::new(PROVIDER_ERRORS.clone()),
        Box::new(BREAKER_TRIPS.clone()),
        Box::new(FILE_WRITE_FAILURES.clone()),
        // Orchestrator
        Box::new(ENTRIES_PROCESSED.clone()),
        Box::new(RUN_DURATION.clone()),
        // Cache
        Box::new(CACHE_WARMED.clone()),
    ]
}
