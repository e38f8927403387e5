//! Startup orchestration.
//!
//! # Order
//! 1. Metrics recorder (optional)
//! 2. Telemetry pipeline (an unavailable exporter only disables export)
//! 3. Listener bind, then serve until a signal arrives
//! 4. Flush and shut down the tracer provider, bounded by the grace period
//!
//! Any failure before serving is fatal. A failed flush on the way out is
//! logged and does not change the exit status.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::{shutdown_signal, Shutdown};
use crate::observability::metrics;
use crate::telemetry::Telemetry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service to completion.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let telemetry = Telemetry::start(&config.telemetry);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &telemetry);
    let served = server.run(listener, shutdown.subscribe());

    let signals = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signals.trigger();
    });

    let result = served.await.map_err(StartupError::Serve);

    flush_telemetry(telemetry, grace).await;
    result
}

/// Shut the tracer provider down off the runtime; its exporter blocks.
async fn flush_telemetry(telemetry: Telemetry, grace: Duration) {
    let flush = tokio::task::spawn_blocking(move || telemetry.shutdown());
    match tokio::time::timeout(grace, flush).await {
        Ok(Ok(Ok(()))) => tracing::info!("Telemetry flushed"),
        Ok(Ok(Err(e))) => tracing::warn!(error = %e, "Telemetry shutdown failed"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Telemetry shutdown task failed"),
        Err(_) => tracing::warn!(grace_secs = grace.as_secs(), "Telemetry flush timed out"),
    }
}
