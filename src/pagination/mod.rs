//! List-endpoint pagination.
//!
//! Query parameters `page`, `limit`, `sortBy`, `sortOrder` are validated into
//! [`PaginationParams`]; responses share the `{ data, meta }` shape.

pub mod service;
pub mod types;

pub use service::paginate;
pub use types::{
    PaginatedResponse, PaginationMeta, PaginationParams, PaginationQuery, SortOrder, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};
