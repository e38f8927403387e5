//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;

use opentelemetry::trace::TraceContextExt;
use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tracegate::{AppConfig, HttpServer, Shutdown, Telemetry};

/// W3C example parent used by propagation tests.
pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const PARENT_SPAN_ID: &str = "00f067aa0ba902b7";
pub const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

/// Defaults with export off and the random failure endpoint made deterministic.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.telemetry.enabled = false;
    config.telemetry.test_failure_rate = 0.0;
    config
}

/// Telemetry whose spans land in memory as soon as they end.
pub fn in_memory_telemetry(config: &AppConfig) -> (Telemetry, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (Telemetry::from_provider(provider, &config.telemetry), exporter)
}

/// Bind an ephemeral port and serve the full router on it.
pub async fn spawn_server(
    config: AppConfig,
) -> (SocketAddr, Shutdown, JoinHandle<std::io::Result<()>>, InMemorySpanExporter) {
    let (telemetry, exporter) = in_memory_telemetry(&config);
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &telemetry);
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        // Keep the provider alive for as long as the server runs.
        let _telemetry = telemetry;
        server.run(listener, rx).await
    });

    (addr, shutdown, handle, exporter)
}

pub fn find_span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans
        .iter()
        .find(|span| span.name == name)
        .unwrap_or_else(|| {
            let names: Vec<_> = spans.iter().map(|s| s.name.to_string()).collect();
            panic!("no span named {name}, have {names:?}")
        })
}

pub fn attr<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

/// Hex span id of the active span in `cx`.
pub fn span_id_of(cx: &opentelemetry::Context) -> String {
    cx.span().span_context().span_id().to_string()
}
