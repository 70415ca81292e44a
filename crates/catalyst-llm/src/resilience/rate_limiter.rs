//! Sliding-window request limiter
//!
//! Each provider in the catalog declares a requests-per-minute ceiling.
//! The router keeps one limiter per provider and consults it twice: during
//! planning (`check`, no side effects) and right before dispatch (`acquire`).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window for rate limiting
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Create a new rate limit config
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Create config for requests per minute
    #[must_use]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Time until the oldest request leaves the window
    pub reset_after: Duration,
    /// Current request count (including this one when allowed)
    pub current: u32,
}

/// In-memory rate limiter using a sliding window
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Map of key -> request timestamps
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            requests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Configured ceiling
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Check whether a request would be allowed, without recording it
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let requests = self.requests.read().await;
        let empty = Vec::new();
        let records = requests.get(key).unwrap_or(&empty);
        self.evaluate(records, now)
    }

    /// Check and record in one step
    pub async fn acquire(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let window_start = now.checked_sub(self.config.window);

        let mut requests = self.requests.write().await;
        let records = requests.entry(key.to_string()).or_default();
        if let Some(start) = window_start {
            records.retain(|t| *t > start);
        }

        let result = self.evaluate(records, now);
        if result.allowed {
            records.push(now);
        }
        result
    }

    /// Get current usage for a key as `(used, limit)`
    pub async fn usage(&self, key: &str) -> (u32, u32) {
        let now = Instant::now();
        let requests = self.requests.read().await;
        let current = requests
            .get(key)
            .map(|records| self.count_in_window(records, now))
            .unwrap_or(0);

        (current, self.config.max_requests)
    }

    /// Reset rate limit for a key
    pub async fn reset(&self, key: &str) {
        let mut requests = self.requests.write().await;
        requests.remove(key);
    }

    /// Drop keys with no requests inside the window; returns how many were removed
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let window_start = now.checked_sub(self.config.window);

        let mut requests = self.requests.write().await;
        let initial_count = requests.len();

        requests.retain(|_, records| {
            if let Some(start) = window_start {
                records.retain(|t| *t > start);
            }
            !records.is_empty()
        });

        initial_count - requests.len()
    }

    fn count_in_window(&self, records: &[Instant], now: Instant) -> u32 {
        match now.checked_sub(self.config.window) {
            Some(start) => records.iter().filter(|t| **t > start).count() as u32,
            None => records.len() as u32,
        }
    }

    fn evaluate(&self, records: &[Instant], now: Instant) -> RateLimitResult {
        let current = self.count_in_window(records, now);
        let reset_after = self.reset_after(records, now);

        if current < self.config.max_requests {
            RateLimitResult {
                allowed: true,
                remaining: self.config.max_requests - current - 1,
                reset_after,
                current: current + 1,
            }
        } else {
            RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after,
                current,
            }
        }
    }

    fn reset_after(&self, records: &[Instant], now: Instant) -> Duration {
        let window_start = now.checked_sub(self.config.window);
        records
            .iter()
            .filter(|t| window_start.map_or(true, |start| **t > start))
            .min()
            .map(|oldest| self.config.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(Duration::ZERO)
    }
}
