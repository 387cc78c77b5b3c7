//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): dispatched requests by method, status, route
//! - `gate_request_duration_seconds` (histogram): dispatch latency by method, route
//! - `gate_rejections_total` (counter): gate refusals by kind
//!
//! Labels never carry key material.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::Rejection;

/// Start the Prometheus scrape endpoint. Without this the macros are no-ops.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a request that reached dispatch.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!("gate_requests_total", &labels).increment(1);

    let labels = [("method", method.to_string()), ("route", route.to_string())];
    histogram!("gate_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a request refused by one of the gates.
pub fn record_rejection(rejection: Rejection) {
    counter!("gate_rejections_total", "kind" => rejection.kind()).increment(1);
}
