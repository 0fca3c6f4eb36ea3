//! HTTP client with retry and rate limiting
//!
//! Wraps a [`Transport`] and classifies every response:
//! - 2xx is handed back
//! - 401/403 fails immediately with `Auth`
//! - 429 and 5xx are retried with backoff, then fail with
//!   `RateLimitExceeded` / `Server`
//! - any other status fails with `UnexpectedStatus`
//! - transport failures are retried like server errors

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{is_auth_status, is_retryable_status, Error, Result};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Longest response body excerpt carried in an error
const ERROR_BODY_LIMIT: usize = 512;

/// Retry and backoff settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial delay for backoff, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Maximum delay for backoff, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Type of backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,
    /// Use the server's `Retry-After` (capped at `max_backoff_ms`) on 429/503
    #[serde(default = "default_true")]
    pub respect_retry_after: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff: BackoffType::default(),
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    /// Set max retries
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set backoff configuration
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff = backoff;
        self.initial_backoff_ms = initial.as_millis() as u64;
        self.max_backoff_ms = max.as_millis() as u64;
        self
    }

    /// Calculate backoff delay for a given attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let initial = Duration::from_millis(self.initial_backoff_ms);
        let delay = match self.backoff {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(attempt)),
        };

        std::cmp::min(delay, Duration::from_millis(self.max_backoff_ms))
    }
}

/// Overall wall-clock budget for one fetch
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    /// Start a deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            at: started + budget,
        }
    }

    /// Time left, or `None` once expired
    pub fn remaining(&self) -> Option<Duration> {
        let left = self.at.saturating_duration_since(Instant::now());
        (!left.is_zero()).then_some(left)
    }

    /// The `Timeout` error for this deadline
    pub fn exceeded(&self) -> Error {
        Error::Timeout {
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

/// HTTP client with retry and rate limiting
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    retry: RetryConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client over a transport
    pub fn new(transport: Arc<dyn Transport>, retry: RetryConfig) -> Self {
        Self {
            transport,
            retry,
            rate_limiter: None,
        }
    }

    /// Pace requests with a rate limiter
    #[must_use]
    pub fn with_rate_limit(mut self, config: &RateLimiterConfig) -> Self {
        self.rate_limiter = Some(RateLimiter::new(config));
        self
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Send a request, retrying transient failures, and return the 2xx
    /// response.
    pub async fn send(
        &self,
        request: &HttpRequest,
        deadline: Option<&Deadline>,
    ) -> Result<HttpResponse> {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                match deadline {
                    Some(d) => {
                        let left = d.remaining().ok_or_else(|| d.exceeded())?;
                        tokio::time::timeout(left, limiter.wait())
                            .await
                            .map_err(|_| d.exceeded())?;
                    }
                    None => limiter.wait().await,
                }
            }

            let outcome = match deadline {
                Some(d) => {
                    let left = d.remaining().ok_or_else(|| d.exceeded())?;
                    tokio::time::timeout(left, self.transport.send(request))
                        .await
                        .map_err(|_| d.exceeded())?
                }
                None => self.transport.send(request).await,
            };

            let (failure, retry_after) = match outcome {
                Ok(response) if response.is_success() => {
                    debug!(
                        "{} {} -> {} (attempt {})",
                        request.method,
                        request.url,
                        response.status,
                        attempt + 1
                    );
                    return Ok(response);
                }
                Ok(response) if is_auth_status(response.status) => {
                    return Err(Error::auth(response.status, excerpt(&response.body)));
                }
                Ok(response) if is_retryable_status(response.status) => {
                    let failure = if response.status == 429 {
                        Error::RateLimitExceeded {
                            attempts: attempt + 1,
                        }
                    } else {
                        Error::Server {
                            status: response.status,
                            attempts: attempt + 1,
                        }
                    };
                    (failure, response.retry_after)
                }
                Ok(response) => {
                    return Err(Error::UnexpectedStatus {
                        status: response.status,
                        body: excerpt(&response.body),
                    });
                }
                Err(e @ Error::Transport { .. }) => (e, None),
                Err(e) => return Err(e),
            };

            if attempt >= max_retries {
                return Err(failure);
            }

            let delay = self.retry_delay(attempt, retry_after);
            warn!(
                "{failure}; attempt {}/{}, retrying in {delay:?}",
                attempt + 1,
                max_retries + 1
            );

            if let Some(d) = deadline {
                if d.remaining().map_or(true, |left| delay >= left) {
                    return Err(d.exceeded());
                }
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Send a request and parse the 2xx body as JSON
    pub async fn send_json(
        &self,
        request: &HttpRequest,
        deadline: Option<&Deadline>,
    ) -> Result<Value> {
        let response = self.send(request, deadline).await?;
        serde_json::from_str(&response.body).map_err(|e| {
            Error::malformed(format!(
                "response from {} is not JSON: {e}",
                request.url
            ))
        })
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        self.retry.delay_for(attempt)
    }

    fn retry_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(after) if self.retry.respect_retry_after => {
                std::cmp::min(after, Duration::from_millis(self.retry.max_backoff_ms))
            }
            _ => self.calculate_backoff(attempt),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("retry", &self.retry)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
