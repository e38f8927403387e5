//! Call-counter dashboard data.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::telemetry::EndpointCalls;

#[derive(Debug, Serialize)]
pub struct CallSummary {
    pub total: u64,
    pub endpoints: Vec<EndpointCalls>,
}

/// `GET /api/telemetry`
pub async fn get_calls(State(state): State<AppState>) -> Json<CallSummary> {
    let calls = state.instrumentation.calls();
    Json(CallSummary {
        total: calls.total(),
        endpoints: calls.snapshot(),
    })
}
