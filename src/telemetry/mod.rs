//! Distributed tracing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers (traceparent / tracestate / baggage)
//!     → propagation.rs (extract → Context, fresh root when absent)
//!     → http middleware opens the server span (spans.rs)
//!     → handlers wrap work with with_api_span / with_database_span
//!         → counter.rs (api call counts)
//!     → spans end bottom-up, exported by provider.rs (OTLP/HTTP batch)
//!     → propagation.rs (inject Context → response headers)
//! ```
//!
//! # Design Decisions
//! - No global tracer provider: `Telemetry` is built once and injected
//! - The active span travels as an explicit `Context` argument
//! - Business errors are recorded then returned unchanged; tracing errors
//!   are logged and swallowed

pub mod counter;
pub mod propagation;
pub mod provider;
pub mod spans;

pub use counter::{CallCounter, EndpointCalls};
pub use propagation::Propagation;
pub use provider::{Telemetry, TelemetryError};
pub use spans::{add_attributes, record_exception, Instrumentation, SpanGuard};
