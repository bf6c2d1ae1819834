//! Integration tests for the dictionary client.
//!
//! Each test runs the real `reqwest` client against an in-process fake of
//! the open API and checks how the reply is parsed or classified.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{FakeUpstream, Reply, TEST_KEY};
use malsaem_mcp::dictionary::{format_json, format_text, SearchQuery};
use malsaem_mcp::error::{ErrorKind, SearchError};

// =============================================================================
// Request Construction
// =============================================================================

#[tokio::test]
async fn test_sends_expected_query_parameters() {
    let upstream = FakeUpstream::spawn(Reply::json(&common::two_items())).await;

    upstream
        .client()
        .search(&SearchQuery::new("  나무 ").with_count(20))
        .await
        .unwrap();

    let query = upstream.last_query();
    assert_eq!(query["key"], TEST_KEY);
    assert_eq!(query["q"], "나무");
    assert_eq!(query["req_type"], "json");
    assert_eq!(query["num"], "20");
    assert_eq!(query["start"], "1");
    assert_eq!(query["advanced"], "y");
    assert_eq!(query["target"], "1");
    assert_eq!(query["part"], "word");
    assert_eq!(query["sort"], "dict");
}

#[tokio::test]
async fn test_basic_mode_omits_advanced_filters() {
    let upstream = FakeUpstream::spawn(Reply::json(&common::two_items())).await;

    upstream
        .client()
        .search(&SearchQuery::new("나무").with_advanced_mode(false))
        .await
        .unwrap();

    let query = upstream.last_query();
    assert_eq!(query["advanced"], "n");
    assert!(!query.contains_key("target"));
    assert!(!query.contains_key("part"));
    assert!(!query.contains_key("sort"));
}

#[tokio::test]
async fn test_invalid_query_never_reaches_network() {
    let upstream = FakeUpstream::spawn(Reply::json(&common::two_items())).await;
    let client = upstream.client();

    let bad = [
        SearchQuery::new("   "),
        SearchQuery::new("나무").with_count(9),
        SearchQuery::new("나무").with_count(101),
        SearchQuery::new("나무").with_start(0),
        SearchQuery::new("나무").with_start(1001),
        SearchQuery::new("나무").with_target(0),
        SearchQuery::new("나무").with_target(11),
    ];

    for query in &bad {
        let err = client.search(query).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{query:?}");
    }
    assert_eq!(upstream.calls(), 0);
}

// =============================================================================
// Response Parsing
// =============================================================================

#[tokio::test]
async fn test_array_items_are_kept_in_order() {
    let upstream = FakeUpstream::spawn(Reply::json(&common::two_items())).await;

    let result = upstream
        .client()
        .search(&SearchQuery::new("나무"))
        .await
        .unwrap();

    assert_eq!(upstream.calls(), 1);
    assert_eq!(result.total, 2);
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].word, "나무");
    assert_eq!(result.items[0].target_code, Some(63297));
    assert_eq!(result.items[1].word, "나무-하다");
    assert_eq!(result.items[1].target_code, Some(412_345));

    let sense = &result.items[0].senses[0];
    assert_eq!(sense.sense_no, Some(1));
    assert_eq!(sense.category.as_deref(), Some("식물"));
    assert_eq!(sense.examples.len(), 2);
    // Empty source strings are treated as absent.
    assert_eq!(sense.examples[0].source, None);
}

#[tokio::test]
async fn test_single_object_item_is_normalised() {
    let upstream = FakeUpstream::spawn(Reply::json(&common::single_item())).await;

    let result = upstream
        .client()
        .search(&SearchQuery::new("사과"))
        .await
        .unwrap();

    let body = serde_json::to_value(format_json(&result)).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["originalLanguage"], "沙果");
    assert_eq!(body["copyright"], "우리말샘(국립국어원), CC BY-SA 2.0 KR");
}

#[tokio::test]
async fn test_empty_channel_formats_as_no_results() {
    let upstream = FakeUpstream::spawn(Reply::json(&json!({
        "channel": { "total": 0, "num": 10 }
    })))
    .await;

    let result = upstream
        .client()
        .search(&SearchQuery::new("없는말"))
        .await
        .unwrap();

    assert_eq!(
        format_text(&result),
        "검색 결과가 없습니다.\n\n출처: 우리말샘(국립국어원), CC BY-SA 2.0 KR"
    );
}

// =============================================================================
// Error Classification
// =============================================================================

async fn search_error(reply: Reply) -> SearchError {
    let upstream = FakeUpstream::spawn(reply).await;
    let err = upstream
        .client()
        .search(&SearchQuery::new("나무"))
        .await
        .unwrap_err();
    assert_eq!(upstream.calls(), 1, "exactly one upstream attempt");
    err
}

#[tokio::test]
async fn test_429_is_rate_limit() {
    let err = search_error(Reply::text(StatusCode::TOO_MANY_REQUESTS, "slow down")).await;
    assert_eq!(err.kind(), ErrorKind::RateLimit);
    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn test_html_error_page_is_auth() {
    let err = search_error(Reply::html(StatusCode::UNAUTHORIZED)).await;
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.to_string().contains("API key"));
}

#[tokio::test]
async fn test_other_status_is_request_error_with_excerpt() {
    let long_body = "x".repeat(500);
    let err = search_error(Reply::text(StatusCode::BAD_GATEWAY, &long_body)).await;

    let SearchError::Request {
        status,
        reason,
        body,
    } = &err
    else {
        panic!("expected Request error, got {err:?}");
    };
    assert_eq!(*status, 502);
    assert_eq!(reason, "Bad Gateway");
    assert_eq!(body.len(), 200);
}

#[tokio::test]
async fn test_non_json_success_is_format_error() {
    let err = search_error(Reply::text(StatusCode::OK, "<xml/>")).await;
    assert_eq!(err.kind(), ErrorKind::Format);

    let err = search_error(Reply::json(&json!(["not", "an", "object"]))).await;
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[tokio::test]
async fn test_unregistered_key_codes_are_auth() {
    for code in ["020", "021"] {
        let err = search_error(Reply::json(&json!({
            "error": { "error_code": code, "message": "Unregistered key" }
        })))
        .await;
        assert_eq!(err.kind(), ErrorKind::Auth, "code {code}");
    }
}

#[tokio::test]
async fn test_other_error_object_is_api_error() {
    let err = search_error(Reply::json(&json!({
        "error": { "error_code": "100", "message": "Incorrect query request" }
    })))
    .await;

    assert_eq!(err.kind(), ErrorKind::Api);
    assert!(err.to_string().contains("100"));
    assert!(err.to_string().contains("Incorrect query request"));
}

#[tokio::test]
async fn test_network_failure_does_not_leak_key() {
    // Nothing listens on port 9 of localhost.
    let config = malsaem_mcp::config::ApiConfig {
        base_url: "http://127.0.0.1:9/api".to_string(),
        ..Default::default()
    };
    let client =
        malsaem_mcp::dictionary::DictionaryClient::from_config(&config, common::test_key())
            .unwrap();

    let err = client.search(&SearchQuery::new("나무")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(!format!("{err} {err:?}").contains(TEST_KEY));
}
