//! HTTP-level tests driving the full router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use futures::StreamExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use presence_api::{AppState, build_app};
use presence_core::config::AppConfig;
use presence_entity::RawPresenceEvent;
use presence_realtime::PresenceEngine;

fn state_with_origins(origins: &[&str]) -> AppState {
    let mut config = AppConfig::default();
    config.gateway.token = "test-token".to_string();
    config.server.cors.allowed_origins = origins.iter().map(|o| o.to_string()).collect();
    AppState::new(Arc::new(config), PresenceEngine::default())
}

fn raw(value: Value) -> RawPresenceEvent {
    serde_json::from_value(value).expect("raw event")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_activities_sorted_and_shaped() {
    let state = state_with_origins(&[]);
    state.engine.pipeline.process(raw(json!({
        "user": { "id": "200", "username": "zed" },
        "status": "idle"
    })));
    state.engine.pipeline.process(raw(json!({
        "user": { "id": "100", "username": "nelly", "avatar": "abc" },
        "status": "online",
        "activities": [{ "name": "Spotify", "type": 2, "details": "Song A", "state": "Artist A" }]
    })));

    let response = build_app(state).oneshot(get("/activities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["userId"], "100");
    assert_eq!(list[1]["userId"], "200");
    assert_eq!(list[0]["status"], "online");
    assert_eq!(
        list[0]["avatarUrl"],
        "https://cdn.discordapp.com/avatars/100/abc.png?size=256"
    );
    assert_eq!(list[0]["activities"][0]["type"], "listening");
    assert_eq!(list[0]["activities"][0]["media"]["song"], "Song A");
    assert!(list[0]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let app = build_app(state_with_origins(&[]));
    let response = app.oneshot(get("/activities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_get_activity_returns_latest_snapshot() {
    let state = state_with_origins(&[]);
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "u1", "username": "old" }, "status": "online" })));
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "u1", "username": "new" }, "status": "dnd" })));

    let response = build_app(state).oneshot(get("/activities/u1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["username"], "new");
    assert_eq!(body["status"], "dnd");
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = build_app(state_with_origins(&[]));
    let response = app.oneshot(get("/activities/nobody")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({ "message": "User not found" }));
}

#[tokio::test]
async fn test_routes_also_served_under_api_prefix() {
    let state = state_with_origins(&[]);
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "u1" }, "status": "online" })));
    let app = build_app(state);

    let list = app.clone().oneshot(get("/api/activities")).await.unwrap();
    assert_eq!(list.status(), StatusCode::OK);

    let one = app.oneshot(get("/api/activities/u1")).await.unwrap();
    assert_eq!(json_body(one).await["userId"], "u1");
}

#[tokio::test]
async fn test_bot_events_never_listed() {
    let state = state_with_origins(&[]);
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "b1", "bot": true }, "status": "online" })));

    let response = build_app(state).oneshot(get("/activities/b1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_allowed_origin_gets_cors_headers() {
    let app = build_app(state_with_origins(&["https://site.example"]));
    let request = Request::builder()
        .uri("/activities")
        .header(header::ORIGIN, "https://site.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://site.example"
    );
}

#[tokio::test]
async fn test_disallowed_origin_is_403() {
    let app = build_app(state_with_origins(&["https://site.example"]));
    let request = Request::builder()
        .uri("/activities")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Not allowed by CORS" })
    );
}

#[tokio::test]
async fn test_request_without_origin_is_allowed() {
    let app = build_app(state_with_origins(&["https://site.example"]));
    let response = app.oneshot(get("/activities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wildcard_allows_any_origin() {
    let app = build_app(state_with_origins(&["*"]));
    let request = Request::builder()
        .uri("/activities")
        .header(header::ORIGIN, "https://anything.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_health_reports_counts() {
    let state = state_with_origins(&[]);
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "u1" }, "status": "online" })));
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "b1", "bot": true } })));

    let response = build_app(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["snapshots"], 1);
    assert_eq!(body["subscribers"], 0);
    assert_eq!(body["metrics"]["eventsReceived"], 2);
    assert_eq!(body["metrics"]["eventsDropped"], 1);
}

/// Reads SSE body chunks until `frames` complete events have arrived.
async fn read_frames(body: Body, frames: usize) -> Vec<String> {
    let mut stream = body.into_data_stream();
    let mut buffer = String::new();

    while buffer.matches("\n\n").count() < frames {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("frame should arrive")
            .expect("stream should stay open")
            .expect("chunk should be readable");
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    buffer
        .split("\n\n")
        .filter(|frame| frame.starts_with("data:"))
        .map(|frame| frame.trim_start_matches("data:").trim().to_string())
        .collect()
}

#[tokio::test]
async fn test_stream_confirms_then_relays_updates() {
    let state = state_with_origins(&[]);
    state
        .engine
        .pipeline
        .process(raw(json!({ "user": { "id": "before" }, "status": "online" })));
    let engine = state.engine.clone();

    let response = build_app(state).oneshot(get("/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(engine.subscriptions.active(), 1);

    engine.pipeline.process(raw(json!({
        "user": { "id": "after", "username": "nelly" },
        "status": "idle"
    })));

    let frames = read_frames(response.into_body(), 2).await;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], r#"{"message":"connected"}"#);

    let update: Value = serde_json::from_str(&frames[1]).unwrap();
    assert_eq!(update["userId"], "after");
    assert_eq!(update["status"], "idle");
}

#[tokio::test]
async fn test_dropping_stream_releases_subscription() {
    let state = state_with_origins(&[]);
    let engine = state.engine.clone();

    let response = build_app(state).oneshot(get("/stream")).await.unwrap();
    assert_eq!(engine.subscriptions.active(), 1);

    drop(response);
    assert_eq!(engine.subscriptions.active(), 0);

    engine
        .pipeline
        .process(raw(json!({ "user": { "id": "u1" }, "status": "online" })));
    assert_eq!(engine.metrics.snapshot().subscribers_dropped, 0);
}
