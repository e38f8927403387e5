//! JSON API routes.
//!
//! Every handler except the health check wraps its body in
//! `with_api_span`, which counts the call and opens the `api.<endpoint>` span
//! under the request span opened by the middleware.

pub mod error;
pub mod example;
pub mod health;
pub mod paginated;
pub mod store;
pub mod telemetry;
pub mod test_telemetry;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::example::{get_example, post_example};
use self::health::get_health;
use self::paginated::get_paginated;
use self::telemetry::get_calls;
use self::test_telemetry::get_test_telemetry;

pub use error::ApiError;

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/example", get(get_example).post(post_example))
        .route("/api/example-paginated", get(get_paginated))
        .route("/api/test-telemetry", get(get_test_telemetry))
        .route("/api/telemetry", get(get_calls))
        .with_state(state)
}
