//! Bounded response cache keyed by query text.
//!
//! Eviction is FIFO by insertion order: a hit does not refresh an
//! entry's position, so the oldest-inserted entry always goes first.
//! Hit/miss counters are kept for observability only.

use crate::respond::Response;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_CACHE_CAPACITY: usize = 200;

#[derive(Debug)]
pub struct ResponseCache {
    map: HashMap<String, Response>,
    order: VecDeque<String>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    fn cache_key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    pub fn get(&mut self, query: &str) -> Option<Response> {
        match self.map.get(&Self::cache_key(query)) {
            Some(response) => {
                self.hits += 1;
                Some(response.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, query: &str, response: Response) {
        let key = Self::cache_key(query);
        if self.map.contains_key(&key) {
            // Refresh the value without touching insertion order.
            self.map.insert(key, response);
            return;
        }

        if self.map.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.map.insert(key, response);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::respond::{Response, ResponseKind};

    fn response(text: &str) -> Response {
        Response::new(text, ResponseKind::General)
    }

    #[test]
    fn test_get_put_and_counters() {
        let mut cache = ResponseCache::new(10);
        assert!(cache.get("library hours").is_none());
        cache.put("Library Hours", response("open 24/7"));
        let hit = cache.get("  library hours ").expect("case/trim-insensitive key");
        assert_eq!(hit.text, "open 24/7");
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_fifo_eviction_drops_oldest_inserted() {
        let mut cache = ResponseCache::new(200);
        for i in 0..201 {
            cache.put(&format!("query {}", i), response("answer"));
        }
        assert_eq!(cache.len(), 200);
        assert!(cache.get("query 0").is_none());
        for i in 1..201 {
            assert!(cache.get(&format!("query {}", i)).is_some(), "query {} evicted", i);
        }
    }

    #[test]
    fn test_hit_does_not_refresh_position() {
        let mut cache = ResponseCache::new(2);
        cache.put("first", response("1"));
        cache.put("second", response("2"));
        // Touch "first"; a true LRU would now evict "second".
        cache.get("first");
        cache.put("third", response("3"));
        assert!(cache.get("first").is_none());
        assert!(cache.get("second").is_some());
    }
}
