//! Request-side helpers for tracing.
//!
//! # Responsibilities
//! - Carry the request's trace `Context` from middleware to handlers
//! - Derive span name and attributes from the request line and headers
//!
//! # Design Decisions
//! - The context travels in request extensions and is handed to handlers
//!   through the [`TraceCx`] extractor, never through a global
//! - Requests that bypassed the middleware get an empty context, so the
//!   span helpers degrade to fresh root spans instead of failing

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, Method, Uri};
use opentelemetry::{Context, KeyValue};
use opentelemetry_semantic_conventions::attribute::{
    HTTP_REQUEST_METHOD, URL_FULL, URL_PATH, USER_AGENT_ORIGINAL,
};

/// Trace context of the current request.
#[derive(Debug, Clone, Default)]
pub struct TraceCx(pub Context);

impl TraceCx {
    pub fn context(&self) -> &Context {
        &self.0
    }
}

impl<S> FromRequestParts<S> for TraceCx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<TraceCx>().cloned().unwrap_or_default())
    }
}

/// Server span name: `<METHOD> <path>`.
pub fn span_name(method: &Method, uri: &Uri) -> String {
    format!("{} {}", method, uri.path())
}

/// Attributes recorded on the server span when it opens.
pub fn request_attributes(method: &Method, uri: &Uri, headers: &HeaderMap) -> Vec<KeyValue> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    vec![
        KeyValue::new(HTTP_REQUEST_METHOD, method.to_string()),
        KeyValue::new(URL_FULL, uri.to_string()),
        KeyValue::new(URL_PATH, uri.path().to_string()),
        KeyValue::new(USER_AGENT_ORIGINAL, user_agent.to_string()),
    ]
}
