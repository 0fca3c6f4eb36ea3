//! HTTP client module
//!
//! Provides the transport seam and a retrying client on top of it.
//!
//! # Features
//!
//! - **Transport trait**: the fetcher only needs "send request, get status
//!   and body", so tests and callers can swap in their own transport
//! - **Automatic Retries**: 429 and 5xx are retried with backoff
//! - **Rate Limiting**: token bucket pacing using governor
//! - **Deadlines**: an overall wall-clock budget bounds requests and sleeps

mod client;
mod rate_limit;
mod transport;

pub use client::{Deadline, HttpClient, RetryConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportConfig};

#[cfg(test)]
mod tests;
