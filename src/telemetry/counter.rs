//! Per-endpoint API call counter.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::observability::metrics;

/// Monotonic call counts keyed by logical endpoint name.
///
/// Shared by every request through the service state; increments are
/// atomic so overlapping requests never lose updates.
#[derive(Debug, Default)]
pub struct CallCounter {
    counts: DashMap<String, AtomicU64>,
}

/// Point-in-time view of one endpoint's count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCalls {
    pub endpoint: String,
    pub calls: u64,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one invocation of `endpoint` and return the new total.
    pub fn increment(&self, endpoint: &str) -> u64 {
        metrics::record_api_call(endpoint);

        // Fast path avoids allocating the key once the endpoint is known.
        if let Some(count) = self.counts.get(endpoint) {
            return count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        self.counts
            .entry(endpoint.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }

    /// Current count for `endpoint` (0 if never called).
    pub fn get(&self, endpoint: &str) -> u64 {
        self.counts
            .get(endpoint)
            .map(|count| count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// All endpoints seen so far, sorted by name.
    pub fn snapshot(&self) -> Vec<EndpointCalls> {
        let mut calls: Vec<EndpointCalls> = self
            .counts
            .iter()
            .map(|entry| EndpointCalls {
                endpoint: entry.key().clone(),
                calls: entry.value().load(Ordering::Relaxed),
            })
            .collect();
        calls.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        calls
    }

    /// Sum across all endpoints.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counts_per_endpoint() {
        let counter = CallCounter::new();
        assert_eq!(counter.increment("users.list"), 1);
        assert_eq!(counter.increment("users.list"), 2);
        counter.increment("example.get");

        assert_eq!(counter.get("users.list"), 2);
        assert_eq!(counter.get("unknown"), 0);
        assert_eq!(counter.total(), 3);
        assert_eq!(
            counter.snapshot(),
            vec![
                EndpointCalls { endpoint: "example.get".into(), calls: 1 },
                EndpointCalls { endpoint: "users.list".into(), calls: 2 },
            ]
        );
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let counter = Arc::new(CallCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment("hot");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get("hot"), 8000);
    }
}
