//! Response handling for tracing.
//!
//! # Responsibilities
//! - Classify a response as ok or failed for span status
//! - Produce the fallback response used when a handler panics
//!
//! # Design Decisions
//! - Only 2xx counts as ok; redirects and client errors are marked as
//!   errors just like server errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opentelemetry::trace::{Status, TraceContextExt};
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::attribute::HTTP_RESPONSE_STATUS_CODE;

/// `true` for statuses in 200..=299.
pub fn is_ok(status: StatusCode) -> bool {
    status.is_success()
}

/// Record the final status code on the active span of `cx` and set its
/// status from [`is_ok`].
pub fn record_status(cx: &Context, status: StatusCode) {
    let span = cx.span();
    span.set_attribute(KeyValue::new(HTTP_RESPONSE_STATUS_CODE, status.as_u16() as i64));
    if is_ok(status) {
        span.set_status(Status::Ok);
    } else {
        span.set_status(Status::error(status.to_string()));
    }
}

/// Response sent in place of a handler that panicked.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Internal server error",
            "message": "The request could not be completed",
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_2xx_is_ok() {
        assert!(is_ok(StatusCode::OK));
        assert!(is_ok(StatusCode::CREATED));
        assert!(is_ok(StatusCode::NO_CONTENT));
        assert!(!is_ok(StatusCode::MOVED_PERMANENTLY));
        assert!(!is_ok(StatusCode::NOT_FOUND));
        assert!(!is_ok(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(internal_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
