//! Integration tests for tick-server routes
//!
//! Tests cover:
//! - Health endpoint and live stream count
//! - Build information endpoint
//! - Stream headers and first emitted line
//! - Scheduling failures (stream limit, shutdown) surfacing as 503

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Duration;
use tick_server::{build_router, AppState, EmitterSettings};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create app state with the given stream limit
fn setup_state(max_streams: Option<usize>) -> AppState {
    AppState::new(EmitterSettings {
        interval: Duration::from_millis(50),
        max_streams,
        stream_timeout: None,
    })
}

/// Test helper: Create GET request
fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Read body frames until one full line is available
async fn read_line(body: &mut Body) -> String {
    let mut buffer = String::new();
    while !buffer.contains('\n') {
        let frame = tokio::time::timeout(Duration::from_secs(1), body.frame())
            .await
            .expect("Line should arrive within a second")
            .expect("Body should not end")
            .expect("Frame should not error");
        if let Ok(data) = frame.into_data() {
            buffer.push_str(std::str::from_utf8(&data).unwrap());
        }
    }
    buffer
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(setup_state(None));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tick-server");
    assert!(body["version"].is_string());
    assert_eq!(body["active_streams"], 0);
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let app = build_router(setup_state(None));

    let response = app.oneshot(get("/build_info")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(!body["git_hash"].as_str().unwrap().is_empty());
    assert!(body["build_timestamp"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = build_router(setup_state(None));
    let response = app.oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Stream endpoint
// =============================================================================

#[tokio::test]
async fn test_stream_headers_and_first_line() {
    let state = setup_state(None);
    let app = build_router(state.clone());

    let response = app.oneshot(get("/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());

    let mut body = response.into_body();
    let line = read_line(&mut body).await;
    let stamp = line.trim_end_matches('\n');
    assert!(
        chrono::NaiveDateTime::parse_from_str(stamp, tick_common::time::LOCAL_TIMESTAMP_FORMAT)
            .is_ok(),
        "not a timestamp line: {:?}",
        line
    );
    assert_eq!(state.spawner.active_streams(), 1);

    drop(body);
    wait_for_streams(&state, 0).await;
}

#[tokio::test]
async fn test_stream_limit_returns_503() {
    let state = setup_state(Some(1));
    let app = build_router(state.clone());

    let first = app.clone().oneshot(get("/test")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(get("/test")).await.unwrap();
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(second.into_body()).await;
    assert_eq!(body["error"]["code"], "SCHEDULING_FAILED");

    // Releasing the first stream frees the slot.
    drop(first);
    wait_for_streams(&state, 0).await;

    let third = app.oneshot(get("/test")).await.unwrap();
    assert_eq!(third.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stream_rejected_after_shutdown() {
    let state = setup_state(None);
    let app = build_router(state.clone());

    state.spawner.shutdown().await;

    let response = app.clone().oneshot(get("/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let health = extract_json(app.oneshot(get("/health")).await.unwrap().into_body()).await;
    assert_eq!(health["status"], "shutting_down");
}

#[tokio::test]
async fn test_shutdown_ends_open_stream() {
    let state = setup_state(None);
    let app = build_router(state.clone());

    let response = app.oneshot(get("/test")).await.unwrap();
    let mut body = response.into_body();
    read_line(&mut body).await;

    state.spawner.shutdown().await;

    // Remaining buffered lines drain, then the body ends without a marker.
    let rest = tokio::time::timeout(Duration::from_secs(1), body.collect())
        .await
        .expect("Body should end after shutdown")
        .expect("Body should end cleanly")
        .to_bytes();
    assert!(rest.is_empty() || rest.ends_with(b"\n"));
}

/// Poll until the number of live streams drops to `expected`
async fn wait_for_streams(state: &AppState, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while state.spawner.active_streams() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {} live streams, found {}",
            expected,
            state.spawner.active_streams()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
