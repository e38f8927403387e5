//! tracegate
//!
//! An HTTP API whose every request is traced with OpenTelemetry.
//!
//! # Architecture Overview
//!
//! ```text
//!   traceparent ──▶ ┌──────────────────────────────────────────────┐
//!                   │ trace context middleware                     │
//!                   │   exclusions → extract → server span         │
//!                   │     ┌──────────────────────────────────┐     │
//!                   │     │ api handler                      │     │
//!                   │     │   with_api_span  (counts calls)  │     │
//!                   │     │     with_database_span           │     │
//!                   │     └──────────────────────────────────┘     │
//!   traceparent ◀── │   status → span status → inject → end        │
//!                   └──────────────────────────────────────────────┘
//!                                      │ batch
//!                                      ▼
//!                        OTLP/HTTP collector (/v1/traces)
//! ```

use std::path::PathBuf;

use clap::Parser;

use tracegate::config::load_config;
use tracegate::lifecycle;
use tracegate::observability::logging;

#[derive(Parser)]
#[command(name = "tracegate", version, about = "Traced HTTP API server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "TRACEGATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        service = %config.telemetry.service_name,
        environment = %config.telemetry.environment,
        export_enabled = config.telemetry.enabled,
        "tracegate starting"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
