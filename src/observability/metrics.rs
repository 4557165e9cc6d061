//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, matched route, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency per route
//! - `gateway_upstream_duration_seconds` (histogram): content backend latency
//! - `gateway_rejections_total` (counter): gatekeeper rejections by reason
//! - `gateway_cache_events_total` (counter): response cache hits, misses and evictions
//! - `gateway_rate_limit_entries` (gauge): rate-limit table size after a sweep
//!
//! Recording is a no-op until a recorder is installed, so handlers and tests
//! can call these freely.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(endpoint: &'static str, outcome: &'static str, start: Instant) {
    histogram!(
        "gateway_upstream_duration_seconds",
        "endpoint" => endpoint,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(reason: &'static str) {
    counter!("gateway_rejections_total", "reason" => reason).increment(1);
}

pub fn record_cache_event(event: &'static str) {
    counter!("gateway_cache_events_total", "event" => event).increment(1);
}

pub fn record_rate_limit_entries(entries: usize) {
    gauge!("gateway_rate_limit_entries").set(entries as f64);
}
