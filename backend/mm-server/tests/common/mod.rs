#![allow(dead_code)]

//! Test infrastructure for mm-server route tests

use mm_core::{RateLimiter, TtlCache};
use mm_server::{AppState, ShutdownCoordinator};
use mm_sse::BroadcastManager;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use tokio::sync::Mutex;

/// AppState around a private, stopped manager so tests never share the
/// process-wide one
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_limit(1000)
}

pub fn create_test_app_state_with_limit(max_requests: u32) -> AppState {
    AppState {
        manager: BroadcastManager::default(),
        rate_limiter: RateLimiter::new(max_requests, 60).unwrap(),
        publish_cache: Arc::new(Mutex::new(TtlCache::new(100, Duration::from_secs(60)))),
        shutdown: ShutdownCoordinator::new(),
        send_buffer_size: 16,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Next SSE frame from a streaming body, None once the stream has ended
pub async fn next_frame(body: &mut Body) -> Option<Bytes> {
    let frame = body.frame().await?.unwrap();
    frame.into_data().ok()
}

/// Event name of one `event: <type>\ndata: ...\n\n` frame
pub fn event_name(frame: &Bytes) -> String {
    let text = std::str::from_utf8(frame).unwrap();
    text.lines()
        .next()
        .and_then(|line| line.strip_prefix("event: "))
        .unwrap()
        .to_string()
}

/// Let spawned release tasks run, then report whether `id` is registered
pub async fn settle_has_client(manager: &BroadcastManager, id: &str) -> bool {
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    manager.has_client(id).await
}
