//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket pacing between requests.
//! Undocumented endpoints tolerate far less than public APIs, so the quota
//! is expressed as a minimum interval rather than requests per second.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Minimum interval between requests, in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Burst size (max tokens in bucket)
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_burst() -> u32 {
    1
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            burst: default_burst(),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(min_interval: Duration, burst: u32) -> Self {
        Self {
            min_interval_ms: min_interval.as_millis() as u64,
            burst,
        }
    }

    /// Minimum interval as a duration
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let period = config.min_interval().max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}
