//! Integration tests for the fetch module.
//!
//! These tests verify credential handling and failure mapping against mock
//! HTTP servers.

use std::time::Duration;

use scrapehub_core::fetch::{AuthConfig, FetchError, Fetcher, FetcherConfig};
use scrapehub_core::{BROWSER_USER_AGENT, RuleSet, extract};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn setup_page(path_str: &str, html: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_fetch_unauthenticated_page() {
    let mock_server = setup_page("/page", "<title>Hello</title>").await;
    let url = format!("{}/page", mock_server.uri());

    let page = Fetcher::new()
        .fetch_url(&url, &AuthConfig::None, TIMEOUT)
        .await
        .expect("fetch should succeed");

    assert_eq!(page.status, 200);
    assert_eq!(page.requested_url, url);
    assert_eq!(page.body, "<title>Hello</title>");
    assert_eq!(
        page.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
}

#[tokio::test]
async fn test_fetch_sends_browser_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("User-Agent", BROWSER_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = Fetcher::new()
        .fetch_url(&mock_server.uri(), &AuthConfig::None, TIMEOUT)
        .await;
    assert!(result.is_ok(), "fetch failed: {:?}", result.err());
}

#[tokio::test]
async fn test_fetch_basic_auth_header() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("members only"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/private", mock_server.uri());
    let page = Fetcher::new()
        .fetch_url(&url, &AuthConfig::basic("alice", "secret"), TIMEOUT)
        .await
        .expect("basic auth fetch should succeed");
    assert_eq!(page.body, "members only");
}

#[tokio::test]
async fn test_fetch_bearer_auth_header() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = Fetcher::new()
        .fetch_url(&mock_server.uri(), &AuthConfig::bearer("tok-123"), TIMEOUT)
        .await;
    assert!(result.is_ok(), "fetch failed: {:?}", result.err());
}

#[tokio::test]
async fn test_fetch_cookie_header_sent_verbatim() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Cookie", "session=abc; theme=dark"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = Fetcher::new()
        .fetch_url(
            &mock_server.uri(),
            &AuthConfig::cookie("session=abc; theme=dark"),
            TIMEOUT,
        )
        .await;
    assert!(result.is_ok(), "fetch failed: {:?}", result.err());
}

#[tokio::test]
async fn test_fetch_without_auth_sends_no_authorization() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let result = Fetcher::new()
        .fetch_url(&mock_server.uri(), &AuthConfig::None, TIMEOUT)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_fetch_404_reports_status_and_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such page"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    let err = Fetcher::new()
        .fetch_url(&url, &AuthConfig::None, TIMEOUT)
        .await
        .expect_err("404 should fail");

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_retryable());
    match err {
        FetchError::HttpStatus { url: failed, body, .. } => {
            assert_eq!(failed, url);
            assert_eq!(body, "no such page");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_401_is_status_error_not_retry() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = Fetcher::new()
        .fetch_url(&mock_server.uri(), &AuthConfig::bearer("stale"), TIMEOUT)
        .await
        .expect_err("401 should fail");
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_fetch_follows_redirect_and_reports_final_url() {
    let mock_server = MockServer::start().await;
    let final_url = format!("{}/new", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", final_url.as_str()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let requested = format!("{}/old", mock_server.uri());
    let page = Fetcher::new()
        .fetch_url(&requested, &AuthConfig::None, TIMEOUT)
        .await
        .expect("redirect should be followed");
    assert_eq!(page.requested_url, requested);
    assert_eq!(page.final_url, final_url);
    assert_eq!(page.body, "moved");
}

#[tokio::test]
async fn test_fetch_redirect_loop_hits_limit() {
    let mock_server = MockServer::start().await;
    let loop_url = format!("{}/loop", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", loop_url.as_str()))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::with_config(FetcherConfig {
        max_redirects: 3,
        ..FetcherConfig::default()
    })
    .expect("client should build");
    let err = fetcher
        .fetch_url(&loop_url, &AuthConfig::None, TIMEOUT)
        .await
        .expect_err("redirect loop should fail");

    assert!(
        matches!(err, FetchError::TooManyRedirects { limit: 3, .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_fetch_timeout_is_retryable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = Fetcher::new()
        .fetch_url(
            &mock_server.uri(),
            &AuthConfig::None,
            Duration::from_millis(200),
        )
        .await
        .expect_err("slow response should time out");

    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_then_extract_resolves_links_against_final_url() {
    let html = r#"<html><head><title> Catalog </title></head>
        <body><h1>Items</h1><a href="/item/1">One</a><span class="price">9.99</span></body></html>"#;
    let mock_server = setup_page("/shop/index.html", html).await;
    let url = format!("{}/shop/index.html", mock_server.uri());

    let page = Fetcher::new()
        .fetch_url(&url, &AuthConfig::None, TIMEOUT)
        .await
        .expect("fetch should succeed");
    let rules = RuleSet::new(vec![
        scrapehub_core::CommonField::Title.into(),
        scrapehub_core::CommonField::Links.into(),
        scrapehub_core::ExtractionRule::css("price", "span.price").expect("valid selector"),
    ])
    .expect("valid rules");
    let result = extract(&page, &rules);

    assert_eq!(result.source_url(), url);
    assert_eq!(
        result.get("title"),
        Some(&scrapehub_core::FieldValue::Text("Catalog".to_string()))
    );
    assert_eq!(
        result.get("links"),
        Some(&scrapehub_core::FieldValue::List(vec![format!(
            "{}/item/1",
            mock_server.uri()
        )]))
    );
    assert_eq!(
        result.get("price"),
        Some(&scrapehub_core::FieldValue::List(vec!["9.99".to_string()]))
    );
}

#[tokio::test]
async fn test_malformed_target_fails_at_fetch_not_normalize() {
    let target = scrapehub_core::target::normalize("bad host/page").expect("only blank input is rejected");
    assert_eq!(target.normalized_url, "https://bad host/page");

    let err = Fetcher::new()
        .fetch(&target, &AuthConfig::None, TIMEOUT)
        .await
        .expect_err("malformed URL cannot be fetched");
    assert!(matches!(err, FetchError::Connection { .. }), "got {err:?}");
}
