//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): upstream calls by operation, status
//! - `gateway_request_duration_seconds` (histogram): upstream latency
//! - `gateway_transport_failures_total` (counter): calls with no response, by kind
//! - `gateway_rejected_total` (counter): calls refused before dispatch

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record an upstream call that produced an HTTP response.
pub fn record_upstream(operation: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream call that failed before any response.
pub fn record_transport_failure(operation: &'static str, kind: &'static str, start: Instant) {
    counter!(
        "gateway_transport_failures_total",
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record a call refused by input validation.
pub fn record_rejected(operation: &'static str) {
    counter!("gateway_rejected_total", "operation" => operation).increment(1);
}
