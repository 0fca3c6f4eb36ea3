//! Tests for endpoint module

use super::*;
use crate::auth::AuthStep;
use crate::error::Error;
use crate::pagination::PaginationConfig;
use crate::template::TemplateContext;
use crate::types::Method;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;

const MINIMAL: &str = r#"
name: jobs
base_url: https://api.example.com/search
items_path: data.results
"#;

fn page_context() -> TemplateContext {
    TemplateContext::new()
        .with("term", "rust developer")
        .with("location", Value::Null)
        .with("page_size", 10)
        .with("cursor", Value::Null)
        .with("offset", 30)
        .with("vars", json!({"sort": "date"}))
}

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_endpoint() {
    let endpoint = load_endpoint_from_str(MINIMAL).unwrap();

    assert_eq!(endpoint.name, "jobs");
    assert_eq!(endpoint.base_url, "https://api.example.com/search");
    assert_eq!(endpoint.method, Method::GET);
    assert_eq!(endpoint.pagination, PaginationConfig::None);
    assert_eq!(endpoint.retry.max_retries, 3);
    assert_eq!(endpoint.request_timeout_secs, 30);
    assert!(endpoint.timeout().is_none());
    assert!(endpoint.auth.is_empty());
}

#[test]
fn test_load_full_endpoint() {
    let yaml = r#"
name: businesses
base_url: https://www.example.com/gql
method: POST
page_size: 10
headers:
  Referer: https://www.example.com/
body:
  variables:
    term: "{{ term }}"
    offset: "{{ offset }}"
items_path: data.search.business
pagination:
  type: offset
  total_path: data.search.total
fields:
  id: id
  name: name
max_items: 25
retry:
  max_retries: 5
  backoff: constant
rate_limit:
  min_interval_ms: 2000
timeout_secs: 120
auth:
  - type: html_token
    url: https://www.example.com/
    pattern: 'csrf: "([^"]+)"'
    header: X-CSRF-Token
"#;

    let endpoint = load_endpoint_from_str(yaml).unwrap();
    assert_eq!(endpoint.method, Method::POST);
    assert_eq!(endpoint.page_size, Some(10));
    assert_eq!(endpoint.max_items, Some(25));
    assert_eq!(endpoint.retry.max_retries, 5);
    assert_eq!(endpoint.retry.initial_backoff_ms, 500);
    assert_eq!(endpoint.rate_limit.as_ref().unwrap().min_interval_ms, 2000);
    assert_eq!(endpoint.timeout(), Some(std::time::Duration::from_secs(120)));
    assert_eq!(endpoint.fields.as_ref().unwrap().len(), 2);
    assert!(matches!(endpoint.auth[0], AuthStep::HtmlToken { .. }));
}

#[test]
fn test_load_endpoint_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MINIMAL.as_bytes()).unwrap();

    let endpoint = load_endpoint(file.path()).unwrap();
    assert_eq!(endpoint.name, "jobs");
}

#[test]
fn test_load_endpoint_preset_by_name() {
    let endpoint = load_endpoint("yelp").unwrap();
    assert_eq!(endpoint.name, "yelp");
}

#[test]
fn test_load_endpoint_not_found() {
    let err = load_endpoint("no-such-site").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not found"));
    assert!(message.contains("twitter"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validation_errors() {
    let cases = [
        "name: ''\nbase_url: https://a.example\nitems_path: x",
        "name: a\nbase_url: not a url\nitems_path: x",
        "name: a\nbase_url: https://a.example\nitems_path: '$[?(@.x'",
        "name: a\nbase_url: https://a.example\nitems_path: x\npage_size: 0",
        "name: a\nbase_url: https://a.example\nitems_path: x\nmax_pages: 0",
    ];

    for yaml in cases {
        assert!(load_endpoint_from_str(yaml).is_err(), "accepted: {yaml}");
    }
}

#[test]
fn test_validation_auth_pattern() {
    let yaml = r#"
name: a
base_url: https://a.example
items_path: x
auth:
  - type: html_token
    url: https://a.example/
    pattern: 'csrf: [a-z]+'
    header: X-CSRF-Token
"#;

    let err = load_endpoint_from_str(yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_validation_unknown_template_variable() {
    let yaml = r#"
name: a
base_url: https://a.example
items_path: x
body:
  variables:
    query: "{{ term }}"
    after: "{{ next_token }}"
"#;

    let err = load_endpoint_from_str(yaml).unwrap_err();
    assert!(matches!(err, Error::Template { .. }));
    assert!(err.to_string().contains("body.variables.after"));

    let base = "name: a\nbase_url: https://a.example\nitems_path: x\nheaders:\n";
    assert!(load_endpoint_from_str(&format!("{base}  X-Key: '{{{{ key }}}}'")).is_err());
    assert!(load_endpoint_from_str(&format!("{base}  X-Key: '{{{{ vars.key }}}}'")).is_ok());
}

#[test]
fn test_allow_empty_items_yaml() {
    let endpoint =
        load_endpoint_from_str("name: a\nbase_url: https://a.example\nitems_path: x").unwrap();
    assert!(!endpoint.allow_empty_items);

    let endpoint = load_endpoint_from_str(
        "name: a\nbase_url: https://a.example\nitems_path: '$..x'\nallow_empty_items: true",
    )
    .unwrap();
    assert!(endpoint.allow_empty_items);
}

#[test]
fn test_templated_base_url_skips_url_check() {
    let yaml = "name: a\nbase_url: '{{ vars.host }}/search'\nitems_path: x";
    assert!(load_endpoint_from_str(yaml).is_ok());
}

// ============================================================================
// Request Rendering Tests
// ============================================================================

#[test]
fn test_build_get_request() {
    let endpoint = EndpointConfig::new("jobs", "https://api.example.com/search", "results")
        .with_param("q", "{{ term }}")
        .with_param("where", "{{ location }}")
        .with_param("start", "{{ offset }}")
        .with_param("sort", "{{ vars.sort }}")
        .with_header("X-Cursor", "{{ cursor }}")
        .with_header("Referer", "https://www.example.com/");

    let request = endpoint.build_request(&page_context()).unwrap();

    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url, "https://api.example.com/search");
    // BTreeMap order; blank location is dropped
    assert_eq!(
        request.query,
        vec![
            ("q".to_string(), "rust developer".to_string()),
            ("sort".to_string(), "date".to_string()),
            ("start".to_string(), "30".to_string()),
        ]
    );
    assert_eq!(request.headers.len(), 1);
    assert!(request.body.is_none());
}

#[test]
fn test_build_request_structured_param() {
    let endpoint = EndpointConfig::new("tl", "https://api.example.com/graphql", "x").with_param(
        "variables",
        json!({"rawQuery": "{{ term }}", "count": "{{ page_size }}", "cursor": "{{ cursor }}"}),
    );

    let request = endpoint.build_request(&page_context()).unwrap();
    let (name, encoded) = &request.query[0];
    assert_eq!(name, "variables");

    let decoded: Value = serde_json::from_str(encoded).unwrap();
    assert_eq!(decoded, json!({"rawQuery": "rust developer", "count": 10}));
}

#[test]
fn test_build_post_request() {
    let mut endpoint = EndpointConfig::new("biz", "https://www.example.com/gql", "x");
    endpoint.method = Method::POST;
    endpoint.body = Some(json!({
        "variables": {"term": "{{ term }}", "offset": "{{ offset }}", "location": "{{ location }}"}
    }));

    let request = endpoint.build_request(&page_context()).unwrap();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.body,
        Some(json!({"variables": {"term": "rust developer", "offset": 30}}))
    );
}

#[test]
fn test_build_request_undefined_variable() {
    let endpoint = EndpointConfig::new("a", "https://a.example", "x").with_param("k", "{{ nope }}");
    let err = endpoint.build_request(&page_context()).unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { .. }));
}

#[test]
fn test_transport_config() {
    let mut endpoint = EndpointConfig::new("a", "https://a.example", "x");
    endpoint.request_timeout_secs = 5;
    endpoint.user_agent = Some("Mozilla/5.0".into());

    let config = endpoint.transport_config();
    assert_eq!(config.request_timeout, std::time::Duration::from_secs(5));
    assert_eq!(config.user_agent, "Mozilla/5.0");
}
