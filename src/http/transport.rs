//! HTTP transport
//!
//! The single seam between the fetcher and the network: send one request,
//! get back status, `Retry-After` and body. No retries happen here.

use crate::error::{Error, Result};
use crate::types::{Method, StringMap};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A fully rendered request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL (without the query string)
    pub url: String,
    /// Request headers
    pub headers: StringMap,
    /// Query parameters in send order
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a POST request with a JSON body
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
            ..Default::default()
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Raw response as seen by the retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed `Retry-After` header (seconds form only)
    pub retry_after: Option<Duration>,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Create a response with no `Retry-After`
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues HTTP requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Errors are transport-level failures only; any
    /// HTTP status comes back as a response.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Configuration for the reqwest transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout
    pub request_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: format!("apitrail/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Transport backed by a reqwest client with a cookie store, so cookies
/// picked up while harvesting tokens are replayed on later requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self.client.request(request.method.into(), &request.url);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        debug!("{} {}", request.method, request.url);

        let response = req
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = extract_retry_after(&response);
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}
