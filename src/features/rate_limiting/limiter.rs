//! # Feature: Rate Limiting
//!
//! Prevents spam with configurable request limits per scope-user pair. Uses a
//! sliding window over DashMap for concurrent access. Scopes keep limits for
//! different commands independent.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Expired keys are pruned every few hundred checks
//! - 1.2.0: Keyed by command scope instead of bot id
//! - 1.1.0: Composite keys
//! - 1.0.0: Initial release with per-user sliding window rate limiting

use dashmap::DashMap;
use serenity::model::id::UserId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

type RateLimitKey = (&'static str, UserId);

const PRUNE_EVERY: usize = 256;

pub struct RateLimiter {
    requests: DashMap<RateLimitKey, Vec<Instant>>,
    max_requests: usize,
    time_window: Duration,
    checks: AtomicUsize,
}

impl RateLimiter {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        RateLimiter {
            requests: DashMap::new(),
            max_requests,
            time_window,
            checks: AtomicUsize::new(0),
        }
    }

    /// Record a request and report whether it is within the limit
    pub fn check_rate_limit(&self, scope: &'static str, user_id: UserId) -> bool {
        // Must run before the entry guard below is taken
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }

        let now = Instant::now();
        let mut entry = self.requests.entry((scope, user_id)).or_default();

        entry.retain(|&time| now.duration_since(time) < self.time_window);

        if entry.len() >= self.max_requests {
            false
        } else {
            entry.push(now);
            true
        }
    }

    /// Drop keys whose requests have all left the window
    pub fn prune(&self) {
        let now = Instant::now();
        self.requests.retain(|_, times| {
            times.retain(|&time| now.duration_since(time) < self.time_window);
            !times.is_empty()
        });
    }

    /// Number of tracked (scope, user) keys
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&self) {
        self.requests.clear();
    }
}
