//! W3C trace context propagation over HTTP headers.
//!
//! # Responsibilities
//! - Extract `traceparent` / `tracestate` / `baggage` from request headers
//! - Inject the active context into response headers
//!
//! # Design Decisions
//! - Extraction never fails: missing or malformed headers yield an empty
//!   context, so the next span starts a fresh trace
//! - Extraction always starts from `Context::new()`, never from whatever
//!   happens to be attached to the current task
//! - Header values the propagator produces but `http` rejects are logged and
//!   skipped instead of failing the response

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{TextMapCompositePropagator, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;
use opentelemetry_http::HeaderExtractor;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};

/// W3C trace parent header.
pub const TRACEPARENT: &str = "traceparent";
/// W3C trace state header.
pub const TRACESTATE: &str = "tracestate";
/// W3C baggage header.
pub const BAGGAGE: &str = "baggage";

/// Cloneable handle to the configured text-map propagator.
#[derive(Clone)]
pub struct Propagation {
    propagator: Arc<TextMapCompositePropagator>,
}

impl Propagation {
    /// Trace context plus baggage, the W3C pair.
    pub fn w3c() -> Self {
        let propagator = TextMapCompositePropagator::new(vec![
            Box::new(TraceContextPropagator::new()),
            Box::new(BaggagePropagator::new()),
        ]);
        Self {
            propagator: Arc::new(propagator),
        }
    }

    /// Rebuild the caller's context from request headers.
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        let cx = self
            .propagator
            .extract_with_context(&Context::new(), &HeaderExtractor(headers));

        if headers.contains_key(TRACEPARENT) && !cx.span().span_context().is_valid() {
            tracing::debug!(
                traceparent = ?headers.get(TRACEPARENT),
                "Ignoring malformed traceparent, starting a new trace"
            );
        }
        cx
    }

    /// Write the propagation fields for `cx` into `headers`.
    ///
    /// Returns the number of headers written.
    pub fn inject(&self, cx: &Context, headers: &mut HeaderMap) -> usize {
        let mut carrier: HashMap<String, String> = HashMap::new();
        self.propagator.inject_context(cx, &mut carrier);

        let mut written = 0;
        for (key, value) in carrier {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                    written += 1;
                }
                _ => {
                    tracing::warn!(header = %key, "Skipping propagation header with invalid encoding");
                }
            }
        }
        written
    }
}

impl Default for Propagation {
    fn default() -> Self {
        Self::w3c()
    }
}

impl std::fmt::Debug for Propagation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Propagation")
            .field("fields", &self.propagator.fields().collect::<Vec<_>>())
            .finish()
    }
}
