//! Request tracing gateway library.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pagination;
pub mod telemetry;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use telemetry::{Instrumentation, Telemetry};
