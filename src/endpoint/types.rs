//! Endpoint definition types

use crate::auth::AuthStep;
use crate::error::Result;
use crate::http::{HttpRequest, RateLimiterConfig, RetryConfig, TransportConfig};
use crate::pagination::PaginationConfig;
use crate::template::{render, render_param, render_value, TemplateContext};
use crate::types::{Method, StringMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Endpoint Definition
// ============================================================================

/// Declarative description of one undocumented API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint name (used in output filenames)
    pub name: String,
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Request URL without the query string (may contain templates)
    pub base_url: String,
    /// HTTP method
    #[serde(default)]
    pub method: Method,
    /// Headers the browser sent (templates allowed)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: StringMap,
    /// Query parameters. Strings are templates; structured values are
    /// rendered recursively and sent JSON-encoded.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    /// JSON body template (POST endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Page size this API serves by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Path to the array of result items
    pub items_path: String,
    /// Treat a response without the items field as an empty page rather
    /// than a malformed one
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_empty_items: bool,
    /// How to reach the next page
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Optional projection: output field name to path inside each item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
    /// Stop after this many pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    /// Stop after this many items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Retry and backoff settings
    #[serde(default)]
    pub retry: RetryConfig,
    /// Minimum spacing between requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimiterConfig>,
    /// Overall deadline for one fetch, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Per-request timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// User agent (defaults to the crate's own)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Extra template variables, available as `{{ vars.<name> }}`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, Value>,
    /// Session bootstrap steps, run once before the first page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auth: Vec<AuthStep>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    /// Create a GET endpoint with defaults for everything else
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        items_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            base_url: base_url.into(),
            method: Method::GET,
            headers: StringMap::new(),
            params: BTreeMap::new(),
            body: None,
            page_size: None,
            items_path: items_path.into(),
            allow_empty_items: false,
            pagination: PaginationConfig::None,
            fields: None,
            max_pages: None,
            max_items: None,
            retry: RetryConfig::default(),
            rate_limit: None,
            timeout_secs: None,
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
            vars: BTreeMap::new(),
            auth: Vec::new(),
        }
    }

    /// Set the pagination convention
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the retry settings
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the page limit
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Set the overall deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Overall fetch deadline, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Settings for the underlying HTTP transport
    pub fn transport_config(&self) -> TransportConfig {
        let mut config = TransportConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..TransportConfig::default()
        };
        if let Some(ref agent) = self.user_agent {
            config.user_agent = agent.clone();
        }
        config
    }

    /// Render the configured headers, leaving out any that render blank
    pub fn render_headers(&self, ctx: &TemplateContext) -> Result<StringMap> {
        let mut headers = StringMap::new();
        for (key, template) in &self.headers {
            let value = render(template, ctx)?;
            if !value.is_empty() {
                headers.insert(key.clone(), value);
            }
        }
        Ok(headers)
    }

    /// Render the request for one page.
    ///
    /// Headers and params that render blank are left out, so an absent
    /// cursor or location does not reach the wire.
    pub fn build_request(&self, ctx: &TemplateContext) -> Result<HttpRequest> {
        let mut request = HttpRequest {
            method: self.method,
            url: render(&self.base_url, ctx)?,
            ..Default::default()
        };

        request.headers = self.render_headers(ctx)?;

        for (key, template) in &self.params {
            if let Some(value) = render_param(template, ctx)? {
                request.query.push((key.clone(), value));
            }
        }

        if let Some(ref body) = self.body {
            request.body = Some(render_value(body, ctx)?);
        }

        Ok(request)
    }
}
