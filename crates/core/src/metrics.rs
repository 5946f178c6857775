//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Stream requests (outcome, duration, finalize reason)
//! - Indexer searches
//! - Reference downloads
//! - External services (catalog, tracker lists, additional sources)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Stream requests
// =============================================================================

/// Stream requests by outcome.
pub static STREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("jackett_relay_stream_requests_total", "Total stream requests"),
        &["outcome"], // "results", "empty", "catalog_failed", "invalid"
    )
    .unwrap()
});

/// Why a session stopped collecting.
pub static FINALIZE_REASONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_relay_finalize_total",
            "Sessions finalized, by trigger",
        ),
        &["reason"], // "deadline", "completed"
    )
    .unwrap()
});

/// Wall-clock duration of a stream request.
pub static STREAM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "jackett_relay_stream_request_duration_seconds",
            "Duration of stream aggregation",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 8.0, 10.0, 15.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Streams returned per response.
pub static STREAMS_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "jackett_relay_streams_returned",
            "Number of streams in each response",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Indexer searches by result.
pub static INDEXER_SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_relay_indexer_searches_total",
            "Indexer searches by result",
        ),
        &["result"], // "ok", "empty", "error"
    )
    .unwrap()
});

/// Raw results dropped at ingestion.
pub static RESULTS_FILTERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_relay_results_filtered_total",
            "Raw results dropped during ingestion",
        ),
        &["reason"], // "seeders", "size", "ignored_title", "no_reference", "not_magnet", "ranked_out"
    )
    .unwrap()
});

// =============================================================================
// Reference resolution
// =============================================================================

/// Reference resolutions by result.
pub static REFERENCE_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_relay_reference_resolutions_total",
            "Magnet and torrent resolutions by result",
        ),
        &["kind", "result"], // kind: "magnet", "torrent"; result: "ok", "error", "discarded"
    )
    .unwrap()
});

// =============================================================================
// External services
// =============================================================================

/// External service requests by service and result.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_relay_external_requests_total",
            "Requests to external services",
        ),
        &["service", "result"], // service: "cinemeta", "trackers", "additional"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Stream requests
        Box::new(STREAM_REQUESTS.clone()),
        Box::new(FINALIZE_REASONS.clone()),
        Box::new(STREAM_REQUEST_DURATION.clone()),
        Box::new(STREAMS_RETURNED.clone()),
        // Search
        Box::new(INDEXER_SEARCHES.clone()),
        Box::new(RESULTS_FILTERED.clone()),
        // Reference resolution
        Box::new(REFERENCE_RESOLUTIONS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
