//! Metrics collection and exposition.
//!
//! # Metrics
//! - `certmint_issuance_total` (counter): issuance attempts by outcome
//! - `certmint_indexed_events_total` (counter): issuance rows written by the indexer
//! - `certmint_indexer_cursor_height` (gauge): last fully scanned block
//! - `certmint_uploaded_bytes_total` (counter): bytes pinned to the content store
//! - `certmint_backend_health` (gauge): 1=healthy, 0=unhealthy, per backend
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Prometheus exposition via a dedicated listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one issuance attempt by outcome (`confirmed`, `failed`).
pub fn record_issuance(outcome: &str) {
    metrics::counter!("certmint_issuance_total", "outcome" => outcome.to_string()).increment(1);
}

/// Count one issuance row written by the indexer.
pub fn record_indexed_event() {
    metrics::counter!("certmint_indexed_events_total").increment(1);
}

/// Record the indexer's cursor after a completed tick.
pub fn record_cursor_height(height: u64) {
    metrics::gauge!("certmint_indexer_cursor_height").set(height as f64);
}

/// Count bytes pinned to the content store.
pub fn record_upload(bytes: u64) {
    metrics::counter!("certmint_uploaded_bytes_total").increment(bytes);
}

/// Record reachability of an external backend.
pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("certmint_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
