//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): traced requests by method, status
//! - `http_request_duration_seconds` (histogram): latency by method
//! - `api_calls_total` (counter): logical API invocations by endpoint
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op, which keeps tests and embedders free of globals
//! - Prometheus exposition is opt-in via configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one traced HTTP request.
pub fn record_request(method: &str, status: u16, started: Instant) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(started.elapsed().as_secs_f64());
}

/// Record one logical API invocation.
pub fn record_api_call(endpoint: &str) {
    metrics::counter!("api_calls_total", "endpoint" => endpoint.to_string()).increment(1);
}
