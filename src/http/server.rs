//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the API handlers
//! - Wire up middleware (trace context, timeouts, request ID, access logs)
//! - Bind the router to a listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, response::IntoResponse, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::paginated::{sample_items, SampleItem};
use crate::api::setup_api_router;
use crate::api::store::UserStore;
use crate::config::AppConfig;
use crate::http::middleware::{trace_context_middleware, PathFilter, TraceContextState};
use crate::telemetry::{Instrumentation, Telemetry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub instrumentation: Instrumentation,
    pub users: Arc<UserStore>,
    pub samples: Arc<Vec<SampleItem>>,
    pub test_failure_rate: f64,
}

/// HTTP server for the traced API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server from configuration and a started telemetry
    /// pipeline.
    pub fn new(config: AppConfig, telemetry: &Telemetry) -> Self {
        let state = AppState {
            instrumentation: telemetry.instrumentation().clone(),
            users: Arc::new(UserStore::default()),
            samples: Arc::new(sample_items()),
            test_failure_rate: config.telemetry.test_failure_rate,
        };

        let trace_state = TraceContextState {
            instrumentation: telemetry.instrumentation().clone(),
            propagation: telemetry.propagation().clone(),
            exclusions: Arc::new(PathFilter::from_config(&config.telemetry)),
        };

        let router = Self::build_router(&config, state, trace_state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The timeout sits inside the trace middleware so a timed-out request
    /// still closes its span with the 408 status.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState, trace_state: TraceContextState) -> Router {
        setup_api_router(state)
            .fallback(not_found)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(trace_state, trace_context_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for serving or driving with `oneshot`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires, then drain in-flight
    /// requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.telemetry.service_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "message": "No route matched" })),
    )
}
