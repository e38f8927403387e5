//! Trace context middleware.
//! Opens one server span per request and propagates W3C trace headers.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt as _;
use opentelemetry::context::FutureExt as _;
use opentelemetry::trace::{SpanKind, TraceContextExt};
use opentelemetry::KeyValue;
use opentelemetry_semantic_conventions::attribute::HTTP_RESPONSE_STATUS_CODE;

use crate::http::middleware::exclusion::PathFilter;
use crate::http::request::{request_attributes, span_name, TraceCx};
use crate::http::response;
use crate::observability::metrics;
use crate::telemetry::{record_exception, Instrumentation, Propagation, SpanGuard};

/// State shared by every invocation of the middleware.
#[derive(Clone, Debug)]
pub struct TraceContextState {
    pub instrumentation: Instrumentation,
    pub propagation: Propagation,
    pub exclusions: Arc<PathFilter>,
}

pub async fn trace_context_middleware(
    State(state): State<TraceContextState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Excluded paths are neither traced nor touched.
    if state.exclusions.is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().clone();

    // 2. Adopt the caller's trace, or start a new one.
    let parent = state.propagation.extract(request.headers());
    let cx = state.instrumentation.start(
        &parent,
        span_name(&method, request.uri()),
        SpanKind::Server,
        request_attributes(&method, request.uri(), request.headers()),
    );
    let guard = SpanGuard::new(cx.clone());

    // 3. Hand the context to handlers and run them with it attached.
    request.extensions_mut().insert(TraceCx(cx.clone()));
    let outcome = AssertUnwindSafe(next.run(request))
        .catch_unwind()
        .with_context(cx.clone())
        .await;

    let mut response = match outcome {
        Ok(response) => {
            response::record_status(&cx, response.status());
            response
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(method = %method, error = %message, "Handler panicked");
            record_exception(&cx, &message);
            cx.span().set_attribute(KeyValue::new(
                HTTP_RESPONSE_STATUS_CODE,
                StatusCode::INTERNAL_SERVER_ERROR.as_u16() as i64,
            ));
            response::internal_error()
        }
    };

    // 4. Tell the caller which span served it.
    state.propagation.inject(&cx, response.headers_mut());
    metrics::record_request(method.as_str(), response.status().as_u16(), started);

    drop(guard);
    response
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
