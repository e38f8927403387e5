//! In-memory stand-in for the users collection.
//!
//! Calls sleep for a fixed latency so database spans have a realistic
//! duration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::error::ApiError;

/// Simulated round trip for reads.
pub const FIND_LATENCY: Duration = Duration::from_millis(50);
/// Simulated round trip for writes.
pub const INSERT_LATENCY: Duration = Duration::from_millis(75);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug)]
pub struct UserStore {
    next_id: AtomicU64,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(3),
        }
    }

    pub async fn find(&self) -> Result<Vec<User>, ApiError> {
        tokio::time::sleep(FIND_LATENCY).await;
        Ok(vec![
            User { id: 1, name: "User 1".into() },
            User { id: 2, name: "User 2".into() },
        ])
    }

    /// Store `document` and return it with its assigned `id`.
    pub async fn insert(&self, document: Map<String, Value>) -> Result<Map<String, Value>, ApiError> {
        tokio::time::sleep(INSERT_LATENCY).await;
        let mut stored = Map::new();
        stored.insert("id".into(), self.next_id.fetch_add(1, Ordering::Relaxed).into());
        stored.extend(document.into_iter().filter(|(key, _)| key != "id"));
        Ok(stored)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
