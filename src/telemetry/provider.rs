//! Telemetry service lifecycle.
//!
//! Owns the tracer provider and everything derived from it. Constructed once
//! at startup with [`Telemetry::start`], passed by value into the HTTP server
//! and shut down explicitly on exit so buffered spans are flushed.

use std::sync::Arc;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::attribute::{DEPLOYMENT_ENVIRONMENT_NAME, SERVICE_VERSION};
use thiserror::Error;

use crate::config::TelemetryConfig;
use crate::telemetry::counter::CallCounter;
use crate::telemetry::propagation::Propagation;
use crate::telemetry::spans::Instrumentation;

/// Instrumentation scope name used for every span this service opens.
pub const TRACER_NAME: &str = "tracegate";

/// Errors raised while starting or stopping the telemetry pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] ExporterBuildError),

    #[error("failed to shut down tracer provider: {0}")]
    Shutdown(#[from] OTelSdkError),
}

/// Explicitly constructed telemetry pipeline.
pub struct Telemetry {
    provider: SdkTracerProvider,
    instrumentation: Instrumentation,
    propagation: Propagation,
}

impl Telemetry {
    /// Build the provider from configuration. When export is enabled spans
    /// are batched to `<collector_url>/v1/traces` over OTLP/HTTP.
    ///
    /// An exporter that cannot be built is logged and skipped: spans are
    /// still created and propagated, just not exported.
    pub fn start(config: &TelemetryConfig) -> Self {
        let mut builder = SdkTracerProvider::builder().with_resource(resource(config));

        if config.enabled {
            let endpoint = traces_endpoint(&config.collector_url);
            match otlp_exporter(&endpoint) {
                Ok(exporter) => {
                    builder = builder.with_batch_exporter(exporter);
                    tracing::info!(endpoint = %endpoint, "Span export enabled");
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        error = %e,
                        "Span exporter unavailable; spans are created but not exported"
                    );
                }
            }
        } else {
            tracing::info!("Span export disabled; spans are created but not exported");
        }

        Self::from_provider(builder.build(), config)
    }

    /// Wrap an already configured provider. Used by tests to plug in an
    /// in-memory exporter.
    pub fn from_provider(provider: SdkTracerProvider, config: &TelemetryConfig) -> Self {
        let tracer = provider.tracer(TRACER_NAME);
        let instrumentation =
            Instrumentation::new(tracer, Arc::new(CallCounter::new()), config.db_system.clone());
        Self {
            provider,
            instrumentation,
            propagation: Propagation::w3c(),
        }
    }

    pub fn instrumentation(&self) -> &Instrumentation {
        &self.instrumentation
    }

    pub fn propagation(&self) -> &Propagation {
        &self.propagation
    }

    /// Flush pending spans and stop the exporter.
    ///
    /// Blocks while the batch processor drains, so call it from a blocking
    /// context or after the async server has stopped.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.provider.shutdown()?;
        tracing::info!("Telemetry shut down");
        Ok(())
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("instrumentation", &self.instrumentation)
            .field("propagation", &self.propagation)
            .finish_non_exhaustive()
    }
}

fn otlp_exporter(endpoint: &str) -> Result<opentelemetry_otlp::SpanExporter, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;
    Ok(exporter)
}

fn resource(config: &TelemetryConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new(SERVICE_VERSION, config.service_version.clone()),
            KeyValue::new(DEPLOYMENT_ENVIRONMENT_NAME, config.environment.clone()),
        ])
        .build()
}

/// OTLP/HTTP traces endpoint for a collector base URL.
pub fn traces_endpoint(collector_url: &str) -> String {
    format!("{}/v1/traces", collector_url.trim_end_matches('/'))
}
