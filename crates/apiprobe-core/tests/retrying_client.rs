//! Integration tests for RetryingClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover success timing, retry counts
//! and backoff, terminal failure, transport errors, timeouts, query
//! parameters and non-2xx outcomes from `execute_once`.

use std::time::{Duration, Instant};

use apiprobe_core::{BackoffPolicy, ProbeError, RequestSpec, RetryPolicy, RetryingClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> RetryingClient {
    RetryingClient::with_timeout(Duration::from_secs(5)).expect("failed to create client")
}

fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, BackoffPolicy::none())
}

#[tokio::test]
async fn test_execute_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/overview/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"symbol": "AAPL"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::get(format!("{}/overview/AAPL", mock_server.uri()));
    let outcome = client()
        .execute(&spec, &fast_retry(3))
        .await
        .expect("execute failed");

    assert!(outcome.elapsed_ms >= 0.0);
    assert!(matches!(outcome.status_code, Some(200..=299)));
    assert_eq!(outcome.payload, Some(json!({"symbol": "AAPL"})));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_always_failing_endpoint_uses_every_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/price/AAPL"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let policy = RetryPolicy::new(3, BackoffPolicy::linear(Duration::from_millis(50)));
    let spec = RequestSpec::get(format!("{}/price/AAPL", mock_server.uri()));

    let start = Instant::now();
    let result = client().execute(&spec, &policy).await;
    let elapsed = start.elapsed();

    match result {
        Err(ProbeError::RequestFailed { attempts, last, .. }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                *last,
                ProbeError::HttpStatus { status: 503, ref body } if body == "unavailable"
            ));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
    // 50ms + 100ms of backoff between the three attempts
    assert!(
        elapsed >= policy.total_backoff(),
        "elapsed {elapsed:?} shorter than backoff {:?}",
        policy.total_backoff()
    );
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fundamentals/AAPL"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fundamentals/AAPL"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"pe": 31.2}))
                .set_delay(Duration::from_millis(30)),
        )
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::get(format!("{}/fundamentals/AAPL", mock_server.uri()));
    let policy = RetryPolicy::new(3, BackoffPolicy::linear(Duration::from_millis(200)));
    let outcome = client()
        .execute(&spec, &policy)
        .await
        .expect("third attempt should succeed");

    assert_eq!(outcome.status_code, Some(200));
    // only the successful attempt is timed, not the 600ms of backoff
    assert!(outcome.elapsed_ms >= 30.0);
    assert!(outcome.elapsed_ms < 600.0, "elapsed {}", outcome.elapsed_ms);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_single_attempt_policy_does_not_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::get(format!("{}/all", mock_server.uri()));
    let result = client()
        .execute(&spec, &RetryPolicy::single_attempt())
        .await;

    let err = result.expect_err("502 must fail");
    assert_eq!(err.status_code(), Some(502));
    assert!(matches!(err, ProbeError::RequestFailed { attempts: 1, .. }));
}

#[tokio::test]
async fn test_transport_error_is_retried_then_reported() {
    // bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let spec = RequestSpec::get(format!("http://{addr}/overview/AAPL"));
    let result = client().execute(&spec, &fast_retry(2)).await;

    match result {
        Err(ProbeError::RequestFailed { attempts, last, .. }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, ProbeError::Transport { .. }));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/historical/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let client = RetryingClient::with_timeout(Duration::from_millis(200)).unwrap();
    let spec = RequestSpec::get(format!("{}/historical/AAPL", mock_server.uri()));
    let result = client.execute(&spec, &RetryPolicy::single_attempt()).await;

    match result {
        Err(ProbeError::RequestFailed { last, .. }) => match *last {
            ProbeError::Timeout { timeout } => assert_eq!(timeout, Duration::from_millis(200)),
            other => panic!("expected Timeout, got {other:?}"),
        },
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_post_with_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/earnings/AAPL"))
        .and(query_param("quarters", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"quarter": "Q1"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::post(format!("{}/earnings/AAPL", mock_server.uri()))
        .with_query("quarters", "4");
    let outcome = client()
        .execute(&spec, &fast_retry(1))
        .await
        .expect("earnings failed");

    assert_eq!(outcome.status_code, Some(200));
}

#[tokio::test]
async fn test_execute_once_returns_not_found_outcome() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/company/maccas"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Company not found"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::get(format!("{}/search/company/maccas", mock_server.uri()));
    let outcome = client()
        .execute_once(&spec)
        .await
        .expect("a 404 is an outcome, not an error");

    assert_eq!(outcome.status_code, Some(404));
    assert_eq!(outcome.payload, Some(json!({"message": "Company not found"})));
    assert!(!outcome.is_success());
    assert_eq!(outcome.error.as_deref(), Some("HTTP 404"));
}

#[tokio::test]
async fn test_user_agent_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/all"))
        .and(wiremock::matchers::header(
            "user-agent",
            apiprobe_core::PROBE_USER_AGENT,
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::get(format!("{}/all", mock_server.uri()));
    let outcome = client().execute(&spec, &fast_retry(1)).await.unwrap();
    assert_eq!(outcome.payload, None);
}
