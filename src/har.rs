//! HAR capture tools
//!
//! Reads HTTP Archive (HAR 1.2) exports from the browser's network panel,
//! the usual starting point for finding an undocumented API. Matching calls
//! can be listed, cookies collected, and a call turned into an
//! [`EndpointConfig`] skeleton to refine by hand.

use crate::endpoint::EndpointConfig;
use crate::error::{Error, Result};
use crate::types::{Method, StringMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Request headers managed by the HTTP client rather than the endpoint
const SKIPPED_HEADERS: &[&str] = &[
    "accept-encoding",
    "connection",
    "content-length",
    "cookie",
    "host",
];

// ============================================================================
// HAR 1.2 Document
// ============================================================================

/// A parsed HAR file
#[derive(Debug, Clone, Deserialize)]
pub struct Har {
    /// Top-level log object
    pub log: HarLog,
}

/// The HAR log
#[derive(Debug, Clone, Deserialize)]
pub struct HarLog {
    /// Recorded request/response pairs
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

/// One recorded exchange
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    /// When the request started
    #[serde(default)]
    pub started_date_time: Option<DateTime<Utc>>,
    /// The request
    pub request: HarRequest,
    /// The response
    #[serde(default)]
    pub response: HarResponse,
}

/// A recorded request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub query_string: Vec<NameValue>,
    #[serde(default)]
    pub cookies: Vec<NameValue>,
    #[serde(default)]
    pub post_data: Option<HarContent>,
}

/// A recorded response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub content: HarContent,
}

/// Request post data or response content
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Name/value pair (headers, query string, cookies)
#[derive(Debug, Clone, Deserialize)]
pub struct NameValue {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Har {
    /// Load a HAR file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| Error::har(format!("{}: {e}", path.display())))
    }

    /// Parse HAR JSON
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::har(format!("invalid HAR document: {e}")))
    }

    /// Calls whose URL contains `pattern`, in the order they started
    pub fn api_calls(&self, pattern: &str) -> Vec<CapturedCall> {
        let mut calls: Vec<_> = self
            .log
            .entries
            .iter()
            .filter(|entry| entry.request.url.contains(pattern))
            .map(CapturedCall::from_entry)
            .collect();

        calls.sort_by_key(|call| call.started);
        debug!("{} of {} HAR entries match '{pattern}'", calls.len(), self.log.entries.len());
        calls
    }

    /// Request cookies sent to URLs containing `domain` (later values win)
    pub fn cookies_for(&self, domain: &str) -> StringMap {
        self.log
            .entries
            .iter()
            .filter(|entry| entry.request.url.contains(domain))
            .flat_map(|entry| entry.request.cookies.iter())
            .filter(|c| !c.name.is_empty() && !c.value.is_empty())
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }
}

// ============================================================================
// Captured Calls
// ============================================================================

/// A request picked out of a HAR file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedCall {
    pub url: String,
    pub method: String,
    pub headers: StringMap,
    pub query_params: StringMap,
    /// Request cookies
    pub cookies: StringMap,
    /// Post body, parsed as JSON when possible
    pub post_body: Option<Value>,
    pub status: u16,
    pub started: Option<DateTime<Utc>>,
    /// Response body, parsed as JSON when possible
    #[serde(skip)]
    pub response_body: Option<Value>,
}

impl CapturedCall {
    fn from_entry(entry: &HarEntry) -> Self {
        let request = &entry.request;
        let pairs = |list: &[NameValue]| -> StringMap {
            list.iter()
                .map(|nv| (nv.name.clone(), nv.value.clone()))
                .collect()
        };

        Self {
            url: request.url.clone(),
            method: request.method.clone(),
            headers: pairs(&request.headers),
            query_params: pairs(&request.query_string),
            cookies: pairs(&request.cookies),
            post_body: request
                .post_data
                .as_ref()
                .and_then(|data| data.text.as_deref())
                .map(parse_text),
            status: entry.response.status,
            started: entry.started_date_time,
            response_body: entry
                .response
                .content
                .text
                .as_deref()
                .and_then(|text| serde_json::from_str(text).ok()),
        }
    }

    /// Turn the call into an endpoint skeleton named `name`.
    ///
    /// Query parameters become params (JSON-encoded values stay
    /// structured), transport-managed headers are dropped, request cookies
    /// are folded into one `Cookie` header, and `items_path` points at the
    /// first array of objects found in the captured response.
    pub fn to_endpoint(&self, name: &str) -> Result<EndpointConfig> {
        let mut url = url::Url::parse(&self.url)?;
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        url.set_query(None);
        url.set_fragment(None);

        let method = Method::parse(&self.method)
            .ok_or_else(|| Error::har(format!("unsupported method {}", self.method)))?;

        let items_path = self
            .response_body
            .as_ref()
            .and_then(guess_items_path)
            .unwrap_or_default();

        let mut endpoint = EndpointConfig::new(name, url.as_str(), items_path);
        endpoint.method = method;
        endpoint.body = self.post_body.clone();

        for (key, value) in params {
            endpoint.params.insert(key, parse_text(&value));
        }

        for (key, value) in &self.headers {
            let lower = key.to_ascii_lowercase();
            if lower.starts_with(':') || SKIPPED_HEADERS.contains(&lower.as_str()) {
                continue;
            }
            endpoint.headers.insert(key.clone(), value.clone());
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            endpoint.headers.insert("Cookie".to_string(), cookie);
        }

        Ok(endpoint)
    }
}

/// JSON objects and arrays stay structured; everything else is a string
fn parse_text(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(text.to_string()),
    }
}

/// Dot path to the first array of objects, searching breadth first
fn guess_items_path(body: &Value) -> Option<String> {
    let mut queue = std::collections::VecDeque::from([(String::new(), body)]);

    while let Some((path, value)) = queue.pop_front() {
        match value {
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                return Some(path);
            }
            Value::Object(map) => {
                for (key, child) in map {
                    if key.contains('.') || key.contains('[') {
                        continue;
                    }
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    queue.push_back((child_path, child));
                }
            }
            _ => {}
        }
    }

    None
}
