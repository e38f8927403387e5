//! Array-backed pagination example.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::http::request::TraceCx;
use crate::http::server::AppState;
use crate::pagination::{paginate, PaginatedResponse, PaginationParams, PaginationQuery};

/// Number of generated sample rows.
pub const SAMPLE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleItem {
    pub id: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub value: u32,
}

/// Sample rows with random creation times (up to ~115 days back) and values.
pub fn sample_items() -> Vec<SampleItem> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    (1..=SAMPLE_SIZE as u32)
        .map(|id| SampleItem {
            id,
            name: format!("Item {id}"),
            created_at: now - Duration::milliseconds(rng.gen_range(0..10_000_000_000)),
            value: rng.gen_range(0..1000),
        })
        .collect()
}

/// `GET /api/example-paginated`
pub async fn get_paginated(
    State(state): State<AppState>,
    TraceCx(cx): TraceCx,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<SampleItem>>, ApiError> {
    let samples = &state.samples;

    state
        .instrumentation
        .with_api_span(&cx, "example.paginated", |_| async move {
            let params = PaginationParams::from_query(&query);
            Ok::<_, ApiError>(Json(paginate(samples.as_slice(), &params)))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_items() {
        let items = sample_items();
        assert_eq!(items.len(), SAMPLE_SIZE);
        assert_eq!(items[0].name, "Item 1");
        assert!(items.iter().all(|item| item.value < 1000 && item.created_at <= Utc::now()));
    }
}
