//! Request lifecycle tests against a local mock server.

use courier_http::{CancellationToken, HttpClient, RequestError, RequestOption, StatusCode};
use std::io::SeekFrom;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_ok(server: &MockServer, route: &str, body: &str) {
    Mock::given(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new([RequestOption::endpoint(&server.uri()).unwrap()]).unwrap()
}

// =============================================================================
// URL resolution and headers
// =============================================================================

#[tokio::test]
async fn test_relative_target_resolves_against_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("order 42"))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server)
        .request("GET", "orders/42", None, [])
        .await
        .check_status(StatusCode::OK)
        .text()
        .await
        .unwrap();

    assert_eq!(body, "order 42");
}

#[tokio::test]
async fn test_header_values_are_joined_with_space() {
    let server = MockServer::start().await;
    mock_ok(&server, "/headers", "").await;

    let response = client_for(&server)
        .request(
            "GET",
            "headers",
            None,
            [RequestOption::header("X-Multi", ["a", "b", "c"])],
        )
        .await;
    assert!(response.is_ok());

    let requests = server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("x-multi").iter().collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0], "a b c");
}

#[tokio::test]
async fn test_call_options_do_not_leak_into_base() {
    let server = MockServer::start().await;
    mock_ok(&server, "/isolation", "").await;

    let client = HttpClient::new([
        RequestOption::endpoint(&server.uri()).unwrap(),
        RequestOption::header("X-Base", ["1"]),
    ])
    .unwrap();

    let response = client
        .request(
            "GET",
            "isolation",
            None,
            [
                RequestOption::without_headers(["X-Base", "X-Base"]),
                RequestOption::header("X-Call", ["2"]),
                RequestOption::timeout(Duration::from_secs(5)),
            ],
        )
        .await;
    assert!(response.is_ok());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-base").is_none());
    assert_eq!(requests[0].headers.get("x-call").unwrap(), "2");

    let base = client.base_config();
    assert_eq!(base.headers().len(), 1);
    assert_eq!(base.headers()["X-Base"], vec!["1"]);
    assert_eq!(base.timeout(), Duration::from_secs(30));
}

// =============================================================================
// Body handling
// =============================================================================

#[tokio::test]
async fn test_zero_content_length_drops_body() {
    let server = MockServer::start().await;
    mock_ok(&server, "/upload", "").await;

    let response = client_for(&server)
        .request(
            "POST",
            "upload",
            Some("payload".into()),
            [RequestOption::content_length(0)],
        )
        .await;
    assert!(response.is_ok());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_body_sent_when_length_unset() {
    let server = MockServer::start().await;
    mock_ok(&server, "/upload", "").await;

    client_for(&server)
        .request("POST", "upload", Some("payload".into()), [])
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, b"payload");
}

#[tokio::test]
async fn test_seekable_body_over_live_response() {
    let server = MockServer::start().await;
    mock_ok(&server, "/video", "0123456789").await;

    let mut body = client_for(&server)
        .request("GET", "video", None, [])
        .await
        .check_status(StatusCode::OK)
        .into_seekable()
        .unwrap();
    body.set_first_fake_chunk();

    // Sniffing probe sees nothing
    let mut probe = [0u8; courier_http::SNIFF_LEN];
    assert_eq!(body.read(&mut probe).await.unwrap(), 0);

    assert_eq!(body.seek(SeekFrom::End(0)).await.unwrap(), 10);
    assert_eq!(body.seek(SeekFrom::Start(0)).await.unwrap(), 0);

    let mut content = String::new();
    body.read_to_string(&mut content).await.unwrap();
    assert_eq!(content, "0123456789");
    body.close().unwrap();
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_status_mismatch_keeps_response() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .request("GET", "missing", None, [])
        .await
        .check_status(StatusCode::OK);

    assert_eq!(
        response.error().and_then(RequestError::status_code),
        Some(StatusCode::NOT_FOUND)
    );
    assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .request(
            "GET",
            "slow",
            None,
            [RequestOption::timeout(Duration::from_millis(100))],
        )
        .await;

    assert!(response.error().is_some_and(RequestError::is_timeout));
    assert!(response.result().is_none());
}

#[tokio::test]
async fn test_cancellation_during_exchange() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let response = client_for(&server)
        .request("GET", "slow", None, [RequestOption::cancellation(cancel)])
        .await;

    assert!(matches!(response.error(), Some(RequestError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_connection_failure() {
    let client = HttpClient::new([]).unwrap();

    let response = client
        .request("GET", "http://127.0.0.1:1/", None, [])
        .await;

    assert!(matches!(response.error(), Some(RequestError::Transport(_))));
    assert!(response.text().await.is_err());
}

#[tokio::test]
async fn test_cancelling_snapshot_token_leaves_client_usable() {
    let server = MockServer::start().await;
    mock_ok(&server, "/after-cancel", "still here").await;
    let client = client_for(&server);

    let token = CancellationToken::new();
    let snapshot = client.base_config();
    assert!(snapshot.cancellation().is_none());

    let per_call = client.request(
        "GET",
        "after-cancel",
        None,
        [RequestOption::cancellation(token.clone())],
    );
    token.cancel();
    assert!(per_call.await.error().is_some_and(RequestError::is_cancelled));

    let body = client
        .request("GET", "after-cancel", None, [])
        .await
        .text()
        .await
        .unwrap();
    assert_eq!(body, "still here");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connection_failure_is_connection_error() {
    let client = HttpClient::new([]).unwrap();

    let response = client
        .request("GET", "http://127.0.0.1:1/", None, [])
        .await;

    assert!(response.error().is_some_and(RequestError::is_connection));
    assert!(!response.error().is_some_and(RequestError::is_timeout));
}

// =============================================================================
// TPS limiting
// =============================================================================

#[tokio::test]
async fn test_same_token_second_request_waits() {
    let server = MockServer::start().await;
    mock_ok(&server, "/limited", "").await;
    let client = client_for(&server);
    let limit = || [RequestOption::tps_limit("request-flow-same-token", 1.0, 1)];

    let start = Instant::now();
    assert!(client.request("POST", "limited", None, limit()).await.is_ok());
    assert!(start.elapsed() < Duration::from_millis(500));

    assert!(client.request("POST", "limited", None, limit()).await.is_ok());
    assert!(start.elapsed() >= Duration::from_millis(900));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_distinct_tokens_do_not_delay_each_other() {
    let server = MockServer::start().await;
    mock_ok(&server, "/limited", "").await;
    let client = client_for(&server);

    let start = Instant::now();
    for token in ["request-flow-a", "request-flow-b", "request-flow-c"] {
        let response = client
            .request("GET", "limited", None, [RequestOption::tps_limit(token, 1.0, 1)])
            .await;
        assert!(response.is_ok());
    }

    assert!(start.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_zero_rate_disables_limiting() {
    let server = MockServer::start().await;
    mock_ok(&server, "/unlimited", "").await;
    let client = client_for(&server);

    let start = Instant::now();
    for _ in 0..3 {
        let response = client
            .request(
                "GET",
                "unlimited",
                None,
                [RequestOption::tps_limit("request-flow-zero", 0.0, 1)],
            )
            .await;
        assert!(response.is_ok());
    }

    assert!(start.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_cancellation_during_rate_limit_wait() {
    let server = MockServer::start().await;
    mock_ok(&server, "/limited", "").await;
    let client = client_for(&server);
    let limit = RequestOption::tps_limit("request-flow-cancel", 0.1, 1);

    assert!(client.request("GET", "limited", None, [limit.clone()]).await.is_ok());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let response = client
        .request(
            "GET",
            "limited",
            None,
            [limit, RequestOption::cancellation(cancel)],
        )
        .await;

    assert!(matches!(response.error(), Some(RequestError::RateLimit(_))));
    assert!(response.error().is_some_and(RequestError::is_cancelled));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
