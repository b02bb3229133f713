//! Rate-limit middleware behavior over the full stack.

mod common;

use http::{HeaderMap, StatusCode};

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_window_metadata_on_every_response() {
    let app = common::build_app(10).await;

    let response = app.request("GET", "/health/v1/live", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(header(&response.headers, "x-ratelimit-limit"), "10");
    assert_eq!(header(&response.headers, "x-ratelimit-remaining"), "9");
    assert_eq!(header(&response.headers, "x-ratelimit-used"), "1");
    assert!(response.headers.contains_key("x-ratelimit-reset"));
}

#[tokio::test]
async fn test_denial_answers_429_with_retry_after() {
    let app = common::build_app(2).await;

    for _ in 0..2 {
        let ok = app.request("GET", "/health/v1/live", None, None).await;
        assert_eq!(ok.status, StatusCode::OK);
    }

    let denied = app.request("GET", "/health/v1/live", None, None).await;
    assert_eq!(denied.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&denied.headers, "x-ratelimit-remaining"), "0");
    assert!(denied.headers.contains_key("retry-after"));

    // The body reveals nothing beyond the generic condition.
    assert_eq!(denied.body["error"].as_str(), Some("RATE_LIMITED"));
}

#[tokio::test]
async fn test_limit_applies_before_authorization() {
    let app = common::build_app(1).await;

    // First request spends the budget on a protected route (401).
    let first = app.request("GET", "/account/v1/self", None, None).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);

    // The second is throttled before the authorization layer answers.
    let second = app.request("GET", "/account/v1/self", None, None).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
}
