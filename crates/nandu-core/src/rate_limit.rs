//! Sliding-window request rate limiting.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_REQUESTS_PER_MINUTE: usize = 60;

/// Counts requests in a sliding window; requests beyond the budget
/// are refused until old ones age out.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    budget: usize,
    stamps: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(budget: usize, window: Duration) -> Self {
        Self {
            window,
            budget,
            stamps: VecDeque::with_capacity(budget),
        }
    }

    pub fn per_minute(budget: usize) -> Self {
        Self::new(budget, Duration::from_secs(60))
    }

    /// Record a request attempt; false means over budget.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        while let Some(front) = self.stamps.front() {
            if now.duration_since(*front) > self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }

        if self.stamps.len() >= self.budget {
            return false;
        }
        self.stamps.push_back(now);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_enforced() {
        let mut limiter = RateLimiter::per_minute(3);
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn test_window_slides() {
        let mut limiter = RateLimiter::new(1, Duration::from_millis(10));
        let start = Instant::now();
        assert!(limiter.check_at(start));
        assert!(!limiter.check_at(start + Duration::from_millis(5)));
        assert!(limiter.check_at(start + Duration::from_millis(20)));
    }
}
