//! Integration tests for the LinkedIn job-search client.
//!
//! A wiremock server stands in for the API; call counts are asserted with
//! `Mock::expect` so fail-fast paths are proven to send nothing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use scrapehub_core::linkedin::{
    ApiError, JobSearchQuery, JobType, LinkedInClient, LinkedInConfig, LinkedInCredentials,
    RateLimitState, RateLimitTracker, SessionState,
};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> LinkedInCredentials {
    LinkedInCredentials::new("client", "secret", "https://localhost/callback", "token-1")
}

fn client_for(server: &MockServer, page_size: u32, tracker: Arc<RateLimitTracker>) -> LinkedInClient {
    LinkedInClient::new(
        credentials(),
        LinkedInConfig {
            base_url: server.uri(),
            page_size,
            timeout: Duration::from_secs(5),
        },
        tracker,
    )
    .expect("client should build")
}

fn job(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "companyName": "Acme",
        "location": { "name": "Berlin" },
        "listedAt": 1_700_000_000_000_i64,
        "description": "<p>Build <b>things</b></p>",
        "applyUrl": format!("https://jobs.example/{id}")
    })
}

fn page(ids: &[u64], total: u32) -> Value {
    json!({
        "elements": ids.iter().map(|id| job(*id, "Engineer")).collect::<Vec<_>>(),
        "paging": { "total": total },
        "metadata": { "searchId": "srv-1" }
    })
}

#[tokio::test]
async fn test_search_paginates_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobSearch"))
        .and(query_param("start", "0"))
        .and(query_param("count", "2"))
        .and(query_param("keywords", "rust"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1, 2], 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobSearch"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[3], 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 2, Arc::new(RateLimitTracker::new()));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .expect("query is valid");
    assert_eq!(session.state(), SessionState::Idle);

    let first = client.next_page(&mut session).await.expect("first page");
    assert_eq!(first.len(), 2);
    assert_eq!(session.state(), SessionState::Paginating);
    assert_eq!(session.offset(), 2);
    assert_eq!(session.server_search_id(), Some("srv-1"));
    assert_eq!(first[0].company, "Acme");
    assert_eq!(first[0].location, "Berlin");
    assert_eq!(first[0].description, "Build things");

    let second = client.next_page(&mut session).await.expect("second page");
    assert_eq!(second.len(), 1);
    assert!(session.is_exhausted());

    let err = client
        .next_page(&mut session)
        .await
        .expect_err("exhausted session must not fetch");
    assert!(matches!(err, ApiError::SessionExhausted { .. }));
}

#[tokio::test]
async fn test_search_sends_filters_as_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobSearch"))
        .and(query_param("location", "Berlin"))
        .and(query_param("jobType", "FULL_TIME,CONTRACT"))
        .and(query_param("sortBy", "RELEVANCE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[], 0)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let mut session = client
        .submit(
            JobSearchQuery::new()
                .location("Berlin")
                .job_type(JobType::FullTime)
                .job_type(JobType::Contract),
        )
        .expect("query is valid");
    let records = client.next_page(&mut session).await.expect("page");
    assert!(records.is_empty());
    assert!(session.is_exhausted());
}

#[tokio::test]
async fn test_repeated_ids_are_dropped_from_later_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1, 2], 100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[2, 3], 100)))
        .mount(&server)
        .await;

    let client = client_for(&server, 2, Arc::new(RateLimitTracker::new()));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();
    client.next_page(&mut session).await.unwrap();
    let second = client.next_page(&mut session).await.unwrap();

    let ids: Vec<&str> = second.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);
    assert_eq!(session.offset(), 4);
    assert_eq!(session.records_seen(), 3);
}

#[tokio::test]
async fn test_empty_query_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let err = client
        .submit(JobSearchQuery::new())
        .expect_err("no filters");
    assert!(matches!(err, ApiError::InvalidQuery { .. }));
}

#[tokio::test]
async fn test_missing_credentials_rejected() {
    let err = LinkedInClient::new(
        LinkedInCredentials::new("client", "", "https://cb", ""),
        LinkedInConfig::default(),
        Arc::new(RateLimitTracker::new()),
    )
    .expect_err("incomplete credentials");
    match err {
        ApiError::NotConfigured { missing } => {
            assert_eq!(missing, vec!["LINKEDIN_CLIENT_SECRET", "LINKEDIN_ACCESS_TOKEN"]);
        }
        other => panic!("expected NotConfigured, got {other:?}"),
    }
}

#[tokio::test]
async fn test_spent_quota_fails_fast_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1], 1)))
        .expect(0)
        .mount(&server)
        .await;

    let now = Utc::now();
    let tracker = Arc::new(RateLimitTracker::with_state(RateLimitState {
        remaining: Some(0),
        reset_at: Some(now + TimeDelta::minutes(10)),
        last_checked: Some(now),
    }));
    let client = client_for(&server, 10, tracker);
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();

    let err = client
        .next_page(&mut session)
        .await
        .expect_err("quota is spent");
    match err {
        ApiError::RateLimited {
            wait: Some(wait), ..
        } => {
            assert!(wait > Duration::from_secs(500), "wait was {wait:?}");
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
    // Retryable: the same page can be requested after the reset.
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.offset(), 0);
}

#[tokio::test]
async fn test_passed_reset_allows_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1], 1)))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc::now();
    let tracker = Arc::new(RateLimitTracker::with_state(RateLimitState {
        remaining: Some(0),
        reset_at: Some(now - TimeDelta::seconds(1)),
        last_checked: Some(now - TimeDelta::minutes(5)),
    }));
    let client = client_for(&server, 10, tracker);
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();
    assert_eq!(client.next_page(&mut session).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_429_records_quota_and_blocks_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = Arc::new(RateLimitTracker::new());
    let client = client_for(&server, 10, Arc::clone(&tracker));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();

    let err = client.next_page(&mut session).await.expect_err("429");
    assert!(matches!(err, ApiError::RateLimited { reset_at: Some(_), .. }));
    assert!(err.is_retryable());
    assert_eq!(session.state(), SessionState::Idle);

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.remaining, Some(0));
    assert!(snapshot.reset_at.is_some_and(|reset| reset > Utc::now()));

    // Second call is refused locally; the mock still sees exactly one request.
    let err = client.next_page(&mut session).await.expect_err("blocked");
    assert!(matches!(err, ApiError::RateLimited { .. }));
}

#[tokio::test]
async fn test_429_without_reset_reports_unknown_wait_and_does_not_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let tracker = Arc::new(RateLimitTracker::new());
    let client = client_for(&server, 10, Arc::clone(&tracker));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();

    let err = client.next_page(&mut session).await.expect_err("429");
    assert!(matches!(
        err,
        ApiError::RateLimited {
            reset_at: None,
            wait: None
        }
    ));
    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.remaining, Some(0));
    assert_eq!(snapshot.reset_at, None);

    // No reset time means no local block: the next call reaches the server.
    let err = client.next_page(&mut session).await.expect_err("429 again");
    assert!(matches!(err, ApiError::RateLimited { reset_at: None, .. }));
}

#[tokio::test]
async fn test_rate_limit_headers_tracked_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Remaining", "42")
                .insert_header("X-RateLimit-Reset", "300")
                .set_body_json(page(&[1], 1)),
        )
        .mount(&server)
        .await;

    let tracker = Arc::new(RateLimitTracker::new());
    let client = client_for(&server, 10, Arc::clone(&tracker));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();
    client.next_page(&mut session).await.unwrap();

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.remaining, Some(42));
    assert!(snapshot.reset_at.is_some());
    assert!(snapshot.last_checked.is_some());
    assert_eq!(tracker.blocked_until(Utc::now()).await, None);
}

#[tokio::test]
async fn test_401_fails_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();

    let err = client.next_page(&mut session).await.expect_err("401");
    assert!(matches!(err, ApiError::AuthExpired { status: 401 }));
    assert!(!err.is_retryable());
    assert_eq!(session.state(), SessionState::Failed);

    let err = client.next_page(&mut session).await.expect_err("failed");
    assert!(matches!(err, ApiError::SessionFailed { .. }));
}

#[tokio::test]
async fn test_server_error_is_retryable_and_keeps_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[7], 1)))
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();

    let err = client.next_page(&mut session).await.expect_err("503");
    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());
    assert_eq!(session.offset(), 0);

    let records = client.next_page(&mut session).await.expect("retry works");
    assert_eq!(records[0].id, "7");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let mut session = client
        .submit(JobSearchQuery::new().keywords("rust"))
        .unwrap();
    let err = client.next_page(&mut session).await.expect_err("bad json");
    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_job_details_and_status_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "99",
            "title": "Staff Engineer",
            "description": "<div>Long   <i>text</i></div>",
            "employmentStatus": "FULL_TIME"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "me" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let details = client.job_details("99").await.expect("details");
    assert_eq!(details.record.title, "Staff Engineer");
    assert_eq!(details.full_description, "Long text");
    assert_eq!(details.employment_status.as_deref(), Some("FULL_TIME"));

    client.check_status().await.expect("status ok");
}

#[tokio::test]
async fn test_status_check_reports_expired_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server, 10, Arc::new(RateLimitTracker::new()));
    let err = client.check_status().await.expect_err("expired");
    assert!(matches!(err, ApiError::AuthExpired { .. }));
}
