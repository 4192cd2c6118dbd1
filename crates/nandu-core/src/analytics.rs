//! Analytics hooks: failed-query ring buffer and the fire-and-forget
//! query logger collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::info;

pub const FAILED_QUERY_CAPACITY: usize = 100;

/// One rejected semantic candidate, kept for later inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedQueryEntry {
    pub query: String,
    pub best_match: Option<String>,
    pub best_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Bounded drop-oldest buffer of failed matches. Never persisted by
/// the core; durable storage belongs to the logging collaborator.
#[derive(Debug, Default)]
pub struct FailedQueryLog {
    entries: VecDeque<FailedQueryEntry>,
}

impl FailedQueryLog {
    pub fn record(&mut self, query: &str, best_match: Option<&str>, best_score: f64) {
        if self.entries.len() >= FAILED_QUERY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(FailedQueryEntry {
            query: query.to_string(),
            // Truncate long candidate keys, they are only a hint.
            best_match: best_match.map(|m| m.chars().take(100).collect()),
            best_score,
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &FailedQueryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fire-and-forget analytics collaborator. Implementations must never
/// block or fail the user-facing response.
pub trait QueryLogger: Send + Sync {
    fn log(&self, query: &str, category: &str, result_count: usize);
}

/// Default logger: emits a structured tracing event and nothing else.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl QueryLogger for TracingLogger {
    fn log(&self, query: &str, category: &str, result_count: usize) {
        info!(query, category, result_count, "query handled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let mut log = FailedQueryLog::default();
        for i in 0..(FAILED_QUERY_CAPACITY + 5) {
            log.record(&format!("query {}", i), None, 0.1);
        }
        assert_eq!(log.len(), FAILED_QUERY_CAPACITY);
        assert_eq!(log.entries().next().unwrap().query, "query 5");
    }

    #[test]
    fn test_best_match_truncated() {
        let mut log = FailedQueryLog::default();
        let long_key = "k".repeat(300);
        log.record("q", Some(&long_key), 0.2);
        assert_eq!(log.entries().next().unwrap().best_match.as_ref().unwrap().len(), 100);
    }
}
