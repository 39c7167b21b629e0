//! Integration tests for the fetchers
//!
//! These tests use wiremock to create mock HTTP servers and run both fetchers
//! end-to-end over the real reqwest transport.

use std::sync::Arc;
use std::time::Duration;
use sumi_fetch::config::{parse_config, Config, UserAgentConfig};
use sumi_fetch::fetcher::{FetcherOptions, PooledFetcher, SequentialFetcher};
use sumi_fetch::request::{CrawlRequest, HttpRequest};
use sumi_fetch::transport::{build_http_client, ReqwestTransport};
use sumi_fetch::{FailureKind, FetchError, FetchResult};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts `/a`, `/b` (slow) and `/c` on a fresh mock server
async fn start_server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>A</html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>B</html>")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 159, 146, 150]))
        .mount(&mock_server)
        .await;

    mock_server
}

fn transport(error_for_status: bool) -> Arc<ReqwestTransport> {
    let client = build_http_client(&UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: Some("https://example.com/contact".to_string()),
        contact_email: Some("test@example.com".to_string()),
    })
    .expect("Failed to build client");
    Arc::new(ReqwestTransport::new(client, error_for_status))
}

fn options(timeout: Duration) -> FetcherOptions {
    FetcherOptions::default().with_timeout(timeout)
}

/// Checks the A / B-times-out / C scenario
fn assert_abc(results: &[FetchResult], base_url: &str) {
    assert_eq!(results.len(), 3);

    let a = results[0].as_response().expect("A should succeed");
    assert_eq!(a.body(), b"<html>A</html>");
    assert_eq!(a.status(), 200);
    assert_eq!(a.content_type(), Some("text/html"));
    assert_eq!(a.request().url(), format!("{}/a", base_url));

    let b = results[1].as_failure().expect("B should time out");
    assert_eq!(b.request().url(), format!("{}/b", base_url));
    assert_eq!(b.error().kind(), FailureKind::Timeout);

    let c = results[2].as_response().expect("C should succeed");
    assert_eq!(c.body(), &[0u8, 159, 146, 150]);
}

#[tokio::test]
async fn test_sequential_batch_with_timeout() {
    let mock_server = start_server().await;
    let base_url = mock_server.uri();

    let fetcher = SequentialFetcher::new(options(Duration::from_millis(500)), transport(true));
    let results = fetcher
        .get(vec![
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ])
        .await;

    assert_abc(&results, &base_url);
}

#[tokio::test]
async fn test_pooled_batch_with_timeout() {
    let mock_server = start_server().await;
    let base_url = mock_server.uri();

    let fetcher = PooledFetcher::new(options(Duration::from_millis(500)), transport(true))
        .expect("Failed to create pooled fetcher");
    let results = fetcher
        .get(vec![
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ])
        .await;

    assert_abc(&results, &base_url);
}

#[tokio::test]
async fn test_error_status_handling() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());

    // Error statuses are failures by default
    let strict = SequentialFetcher::new(options(Duration::from_secs(5)), transport(true));
    let results = strict.get(vec![url.clone()]).await;
    match results[0].as_failure().map(|f| f.error()) {
        Some(FetchError::Status { status, .. }) => assert_eq!(*status, 404),
        other => panic!("expected status failure, got {:?}", other),
    }

    // ...and plain responses when disabled
    let lenient = SequentialFetcher::new(options(Duration::from_secs(5)), transport(false));
    let results = lenient.get(vec![url]).await;
    let response = results[0].as_response().expect("404 should be a response");
    assert_eq!(response.status(), 404);
    assert_eq!(response.text(), "not here");
}

#[tokio::test]
async fn test_unreachable_host_is_reported() {
    // Nothing listens on port 1
    let url = "http://127.0.0.1:1/gone".to_string();

    let fetcher = PooledFetcher::new(options(Duration::from_secs(5)), transport(true))
        .expect("Failed to create pooled fetcher");
    let results = fetcher.get(vec![url.clone()]).await;

    let failure = results[0].as_failure().expect("should fail");
    assert_eq!(failure.request().url(), url);
    assert_eq!(failure.error().url(), url);
}

#[tokio::test]
async fn test_request_headers_are_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lang"))
        .and(header("accept-language", "de"))
        .and(header("x-crawl", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hallo"))
        .mount(&mock_server)
        .await;

    let config = parse_config(
        r#"
[headers]
Accept-Language = "en"
X-Crawl = "yes"
"#,
    )
    .expect("valid config");

    let fetcher = SequentialFetcher::new(
        FetcherOptions::from_config(&config).expect("valid options"),
        transport(true),
    );

    let request = CrawlRequest::new(&format!("{}/lang", mock_server.uri()))
        .expect("valid url")
        .with_header(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("de"),
        );
    let results = fetcher.get(vec![request]).await;

    let response = results[0].as_response().expect("headers should match");
    assert_eq!(response.text(), "hallo");
}

#[tokio::test]
async fn test_user_agent_from_config() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "SumiFetch/2.0 (+https://example.com/bot)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let config = parse_config(
        r#"
[user-agent]
crawler-version = "2.0"
contact-url = "https://example.com/bot"
"#,
    )
    .expect("valid config");

    let fetcher = PooledFetcher::from_config(&config).expect("Failed to create fetcher");
    let results = fetcher.get(vec![format!("{}/", mock_server.uri())]).await;

    assert!(results[0].is_success(), "{:?}", results[0]);
}

#[tokio::test]
async fn test_default_config_fetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("page"))
        .mount(&mock_server)
        .await;

    let fetcher = SequentialFetcher::from_config(&Config::default()).expect("fetcher");
    assert_eq!(fetcher.timeout(), Duration::from_secs(5));

    let url = url::Url::parse(&format!("{}/page", mock_server.uri())).expect("url");
    let results = fetcher.get(vec![url]).await;
    assert_eq!(results[0].as_response().expect("success").text(), "page");
}
