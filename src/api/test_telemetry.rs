//! Endpoint that exercises the whole span pipeline, including failures.

use axum::{extract::State, Json};
use opentelemetry::KeyValue;
use rand::Rng;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::store::User;
use crate::http::request::TraceCx;
use crate::http::server::AppState;
use crate::telemetry::add_attributes;

#[derive(Debug, Serialize)]
pub struct TestTelemetryResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub users: Vec<User>,
}

/// `GET /api/test-telemetry`
///
/// Fails with a 500 on `test_failure_rate` of the calls so error traces can
/// be inspected.
pub async fn get_test_telemetry(
    State(state): State<AppState>,
    TraceCx(cx): TraceCx,
) -> Result<Json<TestTelemetryResponse>, ApiError> {
    let instr = &state.instrumentation;
    let store = &state.users;
    let failure_rate = state.test_failure_rate;

    instr
        .with_api_span(&cx, "test-telemetry.get", |cx| async move {
            let timestamp = chrono::Utc::now().to_rfc3339();
            add_attributes(
                &cx,
                [
                    KeyValue::new("custom.attribute", "test-value"),
                    KeyValue::new("request.timestamp", timestamp.clone()),
                ],
            );

            let users = instr
                .with_database_span(&cx, "find", "users", |_| store.find())
                .await?;

            if rand::thread_rng().gen_bool(failure_rate) {
                return Err(ApiError::Internal(
                    "Random test error in telemetry endpoint".to_string(),
                ));
            }

            Ok::<_, ApiError>(Json(TestTelemetryResponse {
                message: "OpenTelemetry test endpoint",
                timestamp,
                users,
            }))
        })
        .await
}
