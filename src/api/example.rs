//! Example endpoints showing API and database spans.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::error::ApiError;
use crate::api::store::User;
use crate::http::request::TraceCx;
use crate::http::server::AppState;
use crate::telemetry::add_attributes;

#[derive(Debug, Deserialize)]
pub struct ExampleQuery {
    pub param: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExampleList {
    pub success: bool,
    pub data: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct ExampleCreated {
    pub success: bool,
    pub data: Map<String, Value>,
}

/// `GET /api/example`
pub async fn get_example(
    State(state): State<AppState>,
    TraceCx(cx): TraceCx,
    Query(query): Query<ExampleQuery>,
) -> Result<Json<ExampleList>, ApiError> {
    let instr = &state.instrumentation;
    let store = &state.users;

    instr
        .with_api_span(&cx, "example.get", |cx| async move {
            let param = query.param.unwrap_or_else(|| "none".to_string());
            add_attributes(&cx, [KeyValue::new("request.param", param)]);

            let users = instr
                .with_database_span(&cx, "find", "users", |_| store.find())
                .await?;

            add_attributes(&cx, [KeyValue::new("result.count", users.len() as i64)]);
            Ok::<_, ApiError>(Json(ExampleList { success: true, data: users }))
        })
        .await
}

/// `POST /api/example`
pub async fn post_example(
    State(state): State<AppState>,
    TraceCx(cx): TraceCx,
    body: Bytes,
) -> Result<(StatusCode, Json<ExampleCreated>), ApiError> {
    let instr = &state.instrumentation;
    let store = &state.users;

    instr
        .with_api_span(&cx, "example.post", |cx| async move {
            add_attributes(&cx, [KeyValue::new("request.body.size", body.len() as i64)]);

            let document: Map<String, Value> = serde_json::from_slice(&body)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;

            let stored = instr
                .with_database_span(&cx, "insert", "users", |_| store.insert(document))
                .await?;

            Ok::<_, ApiError>((
                StatusCode::CREATED,
                Json(ExampleCreated { success: true, data: stored }),
            ))
        })
        .await
}
