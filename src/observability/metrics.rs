//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (request counts, latency)
//! - Expose a Prometheus-compatible metrics endpoint
//! - Track per-destination and aggregate metrics
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, destination
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Destination label carries the relay/backend name, never a full URL

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::error!(error = %e, "Failed to install metrics exporter");
        return;
    }

    describe_counter!(
        "gateway_requests_total",
        "Total proxied requests by method, status and destination"
    );
    describe_histogram!(
        "gateway_request_duration_seconds",
        "End-to-end latency of proxied requests"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, destination: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("destination", destination.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}
