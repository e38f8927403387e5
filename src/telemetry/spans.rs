//! Span utilities for wrapping units of async work.
//!
//! Every helper takes the parent [`Context`] explicitly and hands the child
//! context to the wrapped work, so nesting follows the call chain rather than
//! any hidden per-task state. The child context is also attached to the
//! awaited future, which keeps libraries that read `Context::current()`
//! consistent with the explicit value.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use opentelemetry::context::FutureExt as _;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::SdkTracer;
use opentelemetry_semantic_conventions::attribute::{
    DB_COLLECTION_NAME, DB_OPERATION_NAME, DB_SYSTEM_NAME, EXCEPTION_MESSAGE, EXCEPTION_TYPE,
    HTTP_ROUTE,
};

use crate::telemetry::counter::CallCounter;

/// Name of the span event carrying a recorded error.
pub const EXCEPTION_EVENT: &str = "exception";

/// Ends the span owned by a context when dropped.
///
/// Ending an SDK span is idempotent, so an explicit `end()` earlier on the
/// same span is harmless. Dropping the guard covers early returns, panics and
/// cancelled futures alike.
#[must_use = "the span ends as soon as the guard is dropped"]
pub struct SpanGuard {
    cx: Context,
}

impl SpanGuard {
    pub fn new(cx: Context) -> Self {
        Self { cx }
    }

    pub fn context(&self) -> &Context {
        &self.cx
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.cx.span().end();
    }
}

/// Handle used by handlers and middleware to open spans.
///
/// Cheap to clone; all clones share the tracer and the call counter.
#[derive(Clone, Debug)]
pub struct Instrumentation {
    tracer: SdkTracer,
    calls: Arc<CallCounter>,
    db_system: String,
}

impl Instrumentation {
    pub fn new(tracer: SdkTracer, calls: Arc<CallCounter>, db_system: impl Into<String>) -> Self {
        Self {
            tracer,
            calls,
            db_system: db_system.into(),
        }
    }

    pub fn calls(&self) -> &CallCounter {
        &self.calls
    }

    /// Open a span of `kind` as a child of `parent` and return the context
    /// that owns it. The caller is responsible for ending it, usually through
    /// a [`SpanGuard`].
    pub fn start(
        &self,
        parent: &Context,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        attributes: Vec<KeyValue>,
    ) -> Context {
        let span = self
            .tracer
            .span_builder(name)
            .with_kind(kind)
            .with_attributes(attributes)
            .start_with_context(&self.tracer, parent);
        parent.with_span(span)
    }

    /// Run `work` inside a new span.
    ///
    /// On `Ok` the span status is set to ok. On `Err` the error is recorded as
    /// an exception event, the status is set to error with the error's
    /// message, and the error is returned untouched. The span is ended exactly
    /// once before this returns.
    pub async fn with_span<T, E, F, Fut>(
        &self,
        parent: &Context,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        attributes: Vec<KeyValue>,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let guard = SpanGuard::new(self.start(parent, name, kind, attributes));
        let cx = guard.context().clone();

        let outcome = work(cx.clone()).with_context(cx.clone()).await;
        match &outcome {
            Ok(_) => cx.span().set_status(Status::Ok),
            Err(err) => record_exception(&cx, err),
        }

        drop(guard);
        outcome
    }

    /// Client span for a data-store call: `database.<collection>.<operation>`.
    pub async fn with_database_span<T, E, F, Fut>(
        &self,
        parent: &Context,
        operation: &str,
        collection: &str,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attributes = vec![
            KeyValue::new(DB_SYSTEM_NAME, self.db_system.clone()),
            KeyValue::new(DB_OPERATION_NAME, operation.to_string()),
            KeyValue::new(DB_COLLECTION_NAME, collection.to_string()),
        ];
        self.with_span(
            parent,
            format!("database.{collection}.{operation}"),
            SpanKind::Client,
            attributes,
            work,
        )
        .await
    }

    /// Server span for an API handler body: `api.<endpoint>`.
    ///
    /// The call counter for `endpoint` is bumped before `work` runs, so
    /// failed calls are counted too.
    pub async fn with_api_span<T, E, F, Fut>(&self, parent: &Context, endpoint: &str, work: F) -> Result<T, E>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.calls.increment(endpoint);

        self.with_span(
            parent,
            format!("api.{endpoint}"),
            SpanKind::Server,
            vec![KeyValue::new(HTTP_ROUTE, endpoint.to_string())],
            work,
        )
        .await
    }
}

/// Add attributes to the active span of `cx`. No-op without an active span.
pub fn add_attributes<I>(cx: &Context, attributes: I)
where
    I: IntoIterator<Item = KeyValue>,
{
    if !cx.has_active_span() {
        return;
    }
    let span = cx.span();
    for attribute in attributes {
        span.set_attribute(attribute);
    }
}

/// Record `err` on the active span of `cx` and mark it as failed.
/// No-op without an active span.
pub fn record_exception<E>(cx: &Context, err: &E)
where
    E: Display + ?Sized,
{
    if !cx.has_active_span() {
        return;
    }
    let message = err.to_string();
    let span = cx.span();
    span.add_event(
        EXCEPTION_EVENT,
        vec![
            KeyValue::new(EXCEPTION_MESSAGE, message.clone()),
            KeyValue::new(EXCEPTION_TYPE, type_name::<E>()),
        ],
    );
    span.set_status(Status::error(message));
}
