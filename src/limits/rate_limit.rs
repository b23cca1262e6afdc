//! Fixed-window rate limiting per key.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Tracked key count at which `check` drops elapsed windows before adding a new key.
const PRUNE_THRESHOLD: usize = 1024;

/// Request counter for one key in the current window.
struct Window {
    started_at: Instant,
    count: u32,
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Time until the current window closes.
    pub reset_after: Duration,
}

/// Allows at most `max_requests` per key in each window of length `window`.
///
/// Windows are tracked independently per key and start with the first
/// request after the previous window has elapsed. Denied requests do not
/// count against the quota. Once many keys are tracked, elapsed windows are
/// dropped when a new key arrives; [`prune`](Self::prune) does the same on
/// demand.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
    }

    /// Record a request for `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() >= PRUNE_THRESHOLD && !windows.contains_key(key) {
            let window = self.window;
            windows.retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        let mut elapsed = now.saturating_duration_since(window.started_at);
        if elapsed >= self.window {
            window.started_at = now;
            window.count = 0;
            elapsed = Duration::ZERO;
        }
        let reset_after = self.window - elapsed;

        if window.count < self.max_requests {
            window.count += 1;
            RateDecision {
                allowed: true,
                remaining: self.max_requests - window.count,
                reset_after,
            }
        } else {
            tracing::warn!(key = %key, reset_after = ?reset_after, "Rate limit exceeded");
            metrics::record_rate_limited(key);
            RateDecision {
                allowed: false,
                remaining: 0,
                reset_after,
            }
        }
    }

    /// Forget windows that have already elapsed.
    pub fn prune(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.retain(|_, w| now.saturating_duration_since(w.started_at) < self.window);
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_allows_up_to_limit_then_denies() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));

        for expected_remaining in (0..5).rev() {
            let decision = limiter.check("alice@example.com");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.check("alice@example.com");
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_after, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));
        assert!(limiter.check("k").allowed);

        tokio::time::advance(Duration::from_millis(40)).await;
        let denied = limiter.check("k");
        assert!(!denied.allowed);
        assert_eq!(denied.reset_after, Duration::from_millis(60));

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(limiter.check("k").allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        assert!(limiter.check("a").allowed);
        assert!(!limiter.check("a").allowed);
        assert!(limiter.check("b").allowed);
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_drops_elapsed_windows() {
        let limiter = RateLimiter::new(3, Duration::from_millis(100));
        limiter.check("old");
        tokio::time::advance(Duration::from_millis(100)).await;
        limiter.check("new");

        limiter.prune();
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_drops_elapsed_windows_when_many_keys_are_tracked() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));
        for i in 0..PRUNE_THRESHOLD {
            limiter.check(&format!("client-{}", i));
        }
        assert_eq!(limiter.tracked_keys(), PRUNE_THRESHOLD);

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(limiter.check("late").allowed);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_windows_survive_automatic_pruning() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));
        for i in 0..PRUNE_THRESHOLD {
            limiter.check(&format!("client-{}", i));
        }

        assert!(limiter.check("late").allowed);
        assert_eq!(limiter.tracked_keys(), PRUNE_THRESHOLD + 1);
        assert!(!limiter.check("client-0").allowed);
    }
}
