//! HTTP middleware.

pub mod exclusion;
pub mod trace_context;

pub use exclusion::PathFilter;
pub use trace_context::{trace_context_middleware, TraceContextState};
