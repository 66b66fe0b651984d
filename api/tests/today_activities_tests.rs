// tests/today_activities_tests.rs
//
// End-to-end tests for GET /api/activities/today. The router is driven
// in-process with `oneshot`, the activity service is a wiremock server and
// the clock is pinned to 2024-03-15T10:00:00 local time.

use std::sync::Arc;

use activities_bff::{clock::FixedClock, AppState, Config};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Local, TimeZone};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{header as header_eq, method, path},
    Mock, MockServer, ResponseTemplate,
};

const TOKEN: &str = "Bearer test-token";

fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
}

fn app_for(backend_api_url: &str) -> Router {
    let config = Config {
        backend_api_url: backend_api_url.to_string(),
        ..Config::default()
    };
    let state = AppState::new(config, Arc::new(FixedClock::new(fixed_now()))).unwrap();
    activities_bff::app(state)
}

async fn mount_activities(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn get_today(app: Router, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .uri("/api/activities/today")
        .method(Method::GET);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_missing_authorization_is_rejected_without_upstream_call() {
    let server = MockServer::start().await;
    mount_activities(&server, json!([])).await;

    let (status, body) = get_today(app_for(&server.uri()), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "No token provided" }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_authorization_is_rejected() {
    let server = MockServer::start().await;
    mount_activities(&server, json!([])).await;

    let (status, body) = get_today(app_for(&server.uri()), Some("")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "No token provided" }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_authorization_and_content_type_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/activity"))
        .and(header_eq("authorization", "Token abc.def:ghi"))
        .and(header_eq("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get_today(app_for(&server.uri()), Some("Token abc.def:ghi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_day_boundaries() {
    let server = MockServer::start().await;
    mount_activities(
        &server,
        json!([
            { "id": "late-today", "timestamp": "2024-03-15T23:59:59" },
            { "id": "tomorrow", "timestamp": "2024-03-16T00:00:00" },
            { "id": "late-yesterday", "timestamp": "2024-03-14T23:59:59" },
            { "id": "midnight-today", "timestamp": "2024-03-15T00:00:00" },
        ]),
    )
    .await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["late-today", "midnight-today"]);
}

#[tokio::test]
async fn test_offset_timestamps_are_compared_as_instants() {
    let server = MockServer::start().await;
    let now = fixed_now();
    let yesterday = now - chrono::Duration::days(1);
    mount_activities(
        &server,
        json!([
            { "id": "now", "timestamp": now.to_rfc3339() },
            { "id": "now-utc", "timestamp": now.with_timezone(&chrono::Utc).to_rfc3339() },
            { "id": "yesterday", "timestamp": yesterday.to_rfc3339() },
            { "id": "now-millis", "timestamp": now.timestamp_millis() },
        ]),
    )
    .await;

    let (_, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(ids(&body), vec!["now", "now-utc", "now-millis"]);
}

#[tokio::test]
async fn test_created_at_fallback_and_precedence() {
    let server = MockServer::start().await;
    mount_activities(
        &server,
        json!([
            { "id": "created-today", "createdAt": "2024-03-15T08:00:00" },
            {
                "id": "timestamp-wins-today",
                "timestamp": "2024-03-15T09:00:00",
                "createdAt": "2024-03-01T09:00:00"
            },
            {
                "id": "timestamp-wins-yesterday",
                "timestamp": "2024-03-14T09:00:00",
                "createdAt": "2024-03-15T09:00:00"
            },
            { "id": "no-time" },
        ]),
    )
    .await;

    let (_, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(ids(&body), vec!["created-today", "timestamp-wins-today"]);
}

#[tokio::test]
async fn test_no_matching_records_is_empty_array() {
    let server = MockServer::start().await;
    mount_activities(
        &server,
        json!([
            { "id": "old", "timestamp": "2023-01-01T12:00:00" },
            { "id": "future", "timestamp": "2025-01-01T12:00:00" },
        ]),
    )
    .await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_order_preserved_and_fields_passed_through() {
    let server = MockServer::start().await;
    let a = json!({
        "id": "A",
        "timestamp": "2024-03-15T07:30:00",
        "type": "workout",
        "details": { "minutes": 30, "tags": ["run", "outdoor"] },
        "score": null
    });
    let b = json!({ "id": "B", "timestamp": "2024-03-14T07:30:00", "type": "meal" });
    let c = json!({ "id": "C", "createdAt": "2024-03-15T06:00:00", "type": "sleep" });
    mount_activities(&server, json!([a.clone(), b, c.clone()])).await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([a, c]));
}

#[tokio::test]
async fn test_upstream_failure_is_relayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/activity"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "Service down" })),
        )
        .mount(&server)
        .await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "error": "Service down" }));
}

#[tokio::test]
async fn test_upstream_failure_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/activity"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "code": "forbidden" })))
        .mount(&server)
        .await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Failed to fetch activities" }));
}

#[tokio::test]
async fn test_upstream_failure_with_non_json_body_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/activity"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_malformed_success_body_is_internal_error() {
    let server = MockServer::start().await;
    mount_activities(&server, json!({ "activities": [] })).await;

    let (status, body) = get_today(app_for(&server.uri()), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_unreachable_upstream_is_internal_error() {
    // Bind and release a port so nothing is listening on it.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let (status, body) = get_today(app_for(&uri), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_backend_url_with_trailing_slash() {
    let server = MockServer::start().await;
    mount_activities(
        &server,
        json!([{ "id": "A", "timestamp": "2024-03-15T11:00:00" }]),
    )
    .await;

    let (status, body) = get_today(app_for(&format!("{}/", server.uri())), Some(TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["A"]);
}
