//! API handler errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors returned by API handlers.
///
/// The `Display` text is what the span records as the exception message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A data-store call failed.
    #[error("{0}")]
    Database(String),

    /// The request body could not be understood.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::Database(_) => "Database error",
            ApiError::BadRequest(_) => "Bad request",
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "API error");
        }
        let body = Json(serde_json::json!({
            "error": self.label(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Database("timeout".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::BadRequest("eof".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Database("timeout".into()).to_string(), "timeout");
    }
}
