//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → middleware/ (exclusions, extract traceparent, open server span)
//!     → request.rs (span name, request attributes, TraceCx extractor)
//!     → [api handlers run under the request context]
//!     → response.rs (status → span status, error bodies)
//!     → middleware/ (inject traceparent, end span)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::TraceCx;
pub use server::{AppState, HttpServer};
