// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search engine.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The parent application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `search_engine_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: find, index, delete, purge, bulk_index
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a completed search-engine operation.
pub fn record_operation(operation: &str, status: &str) {
    counter!(
        "search_engine_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency.
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "search_engine_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record the number of hits a find returned.
pub fn record_result_count(count: usize) {
    histogram!("search_engine_result_count").record(count as f64);
}

/// Record documents pushed through the indexing pipeline.
pub fn record_indexed_documents(count: usize) {
    counter!("search_engine_indexed_documents_total").increment(count as u64);
}

/// Record items skipped during bulk indexing via the error callback.
pub fn record_skipped_documents(count: usize) {
    counter!("search_engine_skipped_documents_total").increment(count as u64);
}
