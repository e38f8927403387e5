//! End-to-end tests against a live listener.

mod common;

use std::time::Duration;

use common::{spawn_server, test_config, TRACEPARENT, TRACE_ID};

#[tokio::test]
async fn test_health_and_request_id() {
    let (addr, shutdown, handle, exporter) = spawn_server(test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-request-id").is_some());
    assert!(res.headers().get("traceparent").is_none());

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(exporter.get_finished_spans().unwrap().is_empty());

    shutdown.trigger();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_trace_continues_over_the_wire() {
    let (addr, shutdown, handle, exporter) = spawn_server(test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/api/example", addr))
        .header("traceparent", TRACEPARENT)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let traceparent = res.headers()["traceparent"].to_str().unwrap().to_string();
    assert!(traceparent.starts_with(&format!("00-{}-", TRACE_ID)));

    // Read before shutdown: stopping the provider clears the in-memory exporter.
    let spans = exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 3);
    assert!(spans
        .iter()
        .all(|span| span.span_context.trace_id().to_string() == TRACE_ID));

    shutdown.trigger();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_call_counts_exposed() {
    let (addr, shutdown, handle, _exporter) = spawn_server(test_config()).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        client
            .get(format!("http://{}/api/example", addr))
            .send()
            .await
            .unwrap();
    }
    client
        .get(format!("http://{}/api/test-telemetry", addr))
        .send()
        .await
        .unwrap();

    let summary: serde_json::Value = client
        .get(format!("http://{}/api/telemetry", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["endpoints"][0]["endpoint"], "example.get");
    assert_eq!(summary["endpoints"][0]["calls"], 3);
    assert_eq!(summary["endpoints"][1]["endpoint"], "test-telemetry.get");
    assert_eq!(summary["endpoints"][1]["calls"], 1);

    shutdown.trigger();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (addr, shutdown, handle, _exporter) = spawn_server(test_config()).await;

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    let client = reqwest::Client::new();
    assert!(client
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .is_err());
}
