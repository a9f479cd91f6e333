//! Request throttling
//!
//! Quick navigation through an over-fetching table can issue several page
//! requests in a row. A token bucket (governor) caps how fast they reach the
//! API; requests beyond the burst wait for a token instead of failing.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Request rate allowed against one API, as read from the `rate_limit`
/// block of an API source config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterConfig {
    /// Sustained page requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimiterConfig {
    /// Rate with an explicit burst
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Zero rates are raised to one so the bucket is never empty forever
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket for the page requests of one client
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Build a limiter from `config`
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Take a token for a request to `url`, waiting if the bucket is empty
    pub async fn acquire(&self, url: &str) {
        if self.try_acquire() {
            return;
        }
        debug!(url, "Page request throttled");
        self.limiter.until_ready().await;
    }

    /// Take a token if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_config_from_api_source_yaml() {
        let config: RateLimiterConfig =
            serde_yaml::from_str("requests_per_second: 5\nburst_size: 2\n").unwrap();
        assert_eq!(config, RateLimiterConfig::new(5, 2));

        let partial: RateLimiterConfig = serde_yaml::from_str("burst_size: 3\n").unwrap();
        assert_eq!(partial, RateLimiterConfig::new(10, 3));
    }

    #[tokio::test]
    async fn test_zero_rate_falls_back_to_one() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_burst_of_page_requests() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(10, 5));
        for _ in 0..5 {
            limiter.acquire("/servers").await;
        }
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_throttled_request_waits_for_token() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1000, 1));
        limiter.acquire("/servers").await;
        assert!(!limiter.try_acquire());

        // Refills after a millisecond at 1000 rps
        limiter.acquire("/servers").await;
    }
}
