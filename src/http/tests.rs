//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryConfig {
    RetryConfig::default().max_retries(3).backoff(
        BackoffType::Constant,
        Duration::from_millis(10),
        Duration::from_millis(100),
    )
}

fn client(retry: RetryConfig) -> HttpClient {
    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    HttpClient::new(Arc::new(transport), retry)
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_backoff_ms, 500);
    assert_eq!(config.max_backoff_ms, 30_000);
    assert_eq!(config.backoff, BackoffType::Exponential);
    assert!(config.respect_retry_after);
}

#[test]
fn test_retry_config_yaml_defaults() {
    let config: RetryConfig = serde_yaml::from_str("max_retries: 5\nbackoff: linear").unwrap();
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff, BackoffType::Linear);
    assert_eq!(config.initial_backoff_ms, 500);
}

#[test_case(BackoffType::Exponential, 0, 100 ; "exponential first")]
#[test_case(BackoffType::Exponential, 1, 200 ; "exponential doubles")]
#[test_case(BackoffType::Exponential, 3, 800 ; "exponential third")]
#[test_case(BackoffType::Exponential, 10, 1000 ; "exponential capped")]
#[test_case(BackoffType::Exponential, 40, 1000 ; "exponential saturates")]
#[test_case(BackoffType::Linear, 2, 300 ; "linear")]
#[test_case(BackoffType::Constant, 5, 100 ; "constant")]
fn test_backoff_delay(backoff: BackoffType, attempt: u32, expected_ms: u64) {
    let config = RetryConfig::default().backoff(
        backoff,
        Duration::from_millis(100),
        Duration::from_secs(1),
    );
    assert_eq!(config.delay_for(attempt), Duration::from_millis(expected_ms));
}

#[test]
fn test_request_builder() {
    let request = HttpRequest::get("https://example.com/api")
        .query("q", "rust")
        .query("page", "2")
        .header("X-Request-Id", "abc123");

    assert_eq!(request.method, crate::types::Method::GET);
    assert_eq!(
        request.query,
        vec![
            ("q".to_string(), "rust".to_string()),
            ("page".to_string(), "2".to_string())
        ]
    );
    assert_eq!(
        request.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert!(request.body.is_none());
}

#[test]
fn test_deadline_remaining() {
    let deadline = Deadline::after(Duration::from_secs(60));
    assert!(deadline.remaining().is_some());

    let expired = Deadline::after(Duration::ZERO);
    assert!(expired.remaining().is_none());
    assert!(matches!(expired.exceeded(), Error::Timeout { .. }));
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_transport_sends_headers_query_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gql"))
        .and(query_param("q", "rust"))
        .and(header("X-CSRF-Token", "tok"))
        .and(body_json(json!({"term": "rust"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    let request = HttpRequest::post(format!("{}/gql", mock_server.uri()), json!({"term": "rust"}))
        .query("q", "rust")
        .header("X-CSRF-Token", "tok");

    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "{}");
}

#[tokio::test]
async fn test_transport_reads_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    let response = transport
        .send(&HttpRequest::get(mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 429);
    assert_eq!(response.retry_after, Some(Duration::from_secs(7)));
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_send_json_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
        .mount(&mock_server)
        .await;

    let data = client(fast_retry())
        .send_json(&HttpRequest::get(format!("{}/api/data", mock_server.uri())), None)
        .await
        .unwrap();

    assert_eq!(data["value"], 42);
}

#[tokio::test]
async fn test_send_json_rejects_non_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&mock_server)
        .await;

    let err = client(fast_retry())
        .send_json(&HttpRequest::get(mock_server.uri()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_retry_on_500_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let response = client(fast_retry())
        .send(&HttpRequest::get(format!("{}/api/flaky", mock_server.uri())), None)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_server_error_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = client(fast_retry().max_retries(2))
        .send(&HttpRequest::get(mock_server.uri()), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Server {
            status: 503,
            attempts: 3
        }
    ));
}

#[tokio::test]
async fn test_rate_limit_exceeded_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&mock_server)
        .await;

    let err = client(fast_retry().max_retries(1))
        .send(&HttpRequest::get(mock_server.uri()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimitExceeded { attempts: 2 }));
}

#[tokio::test]
async fn test_retry_after_is_capped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "120"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&mock_server)
        .await;

    let start = Instant::now();
    let response = client(fast_retry())
        .send(&HttpRequest::get(mock_server.uri()), None)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    // Capped at max_backoff (100ms), not the advertised two minutes
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test_case(401 ; "unauthorized")]
#[test_case(403 ; "forbidden")]
#[tokio::test]
async fn test_auth_failure_not_retried(status: u16) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client(fast_retry())
        .send(&HttpRequest::get(mock_server.uri()), None)
        .await
        .unwrap_err();

    match err {
        Error::Auth { status: s, body } => {
            assert_eq!(s, status);
            assert_eq!(body, "token expired");
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_404_is_unexpected_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client(fast_retry())
        .send(&HttpRequest::get(mock_server.uri()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(fast_retry().max_retries(1))
        .send(&HttpRequest::get(format!("http://{addr}/")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
}

#[tokio::test]
async fn test_deadline_stops_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let retry = RetryConfig::default().max_retries(5).backoff(
        BackoffType::Constant,
        Duration::from_secs(10),
        Duration::from_secs(10),
    );
    let deadline = Deadline::after(Duration::from_millis(500));

    let start = Instant::now();
    let err = client(retry)
        .send(&HttpRequest::get(mock_server.uri()), Some(&deadline))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_deadline_bounds_slow_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let deadline = Deadline::after(Duration::from_millis(200));
    let err = client(fast_retry())
        .send(&HttpRequest::get(mock_server.uri()), Some(&deadline))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }));
}

#[tokio::test]
async fn test_rate_limited_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let http = client(fast_retry())
        .with_rate_limit(&RateLimiterConfig::new(Duration::from_millis(100), 1));
    assert!(http.has_rate_limiter());

    let start = Instant::now();
    let request = HttpRequest::get(mock_server.uri());
    http.send(&request, None).await.unwrap();
    http.send(&request, None).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(80));
}
