//! Route tests for the event stream endpoints
mod common;

use crate::common::{
    create_test_app_state, create_test_app_state_with_limit, event_name, get, json_body,
    next_frame, post_json, settle_has_client,
};

use mm_server::{IDEMPOTENCY_KEY_HEADER, build_router};
use mm_sse::{ChannelSink, EventType};

use std::sync::Arc;

use axum::http::{StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

// =============================================================================
// GET /events
// =============================================================================

#[tokio::test]
async fn given_client_id_when_subscribing_then_event_stream_starts_with_connected() {
    // Given
    let state = create_test_app_state();
    let app = build_router(state.clone());

    // When
    let response = app.oneshot(get("/events?client_id=tab-1")).await.unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

    let mut body = response.into_body();
    let frame = next_frame(&mut body).await.unwrap();
    assert_eq!(event_name(&frame), "connected");
    assert!(String::from_utf8_lossy(&frame).contains("\"clientId\":\"tab-1\""));
    assert!(state.manager.has_client("tab-1").await);
}

#[tokio::test]
async fn given_open_stream_when_broadcast_then_frame_arrives_on_body() {
    let state = create_test_app_state();
    let response = build_router(state.clone())
        .oneshot(get("/events?client_id=tab-1"))
        .await
        .unwrap();
    let mut body = response.into_body();
    next_frame(&mut body).await.unwrap();

    state
        .manager
        .broadcast(EventType::MinutesGenerating, Some(json!({ "meetingId": "m-1" })))
        .await;

    let frame = next_frame(&mut body).await.unwrap();
    assert_eq!(event_name(&frame), "minutes:generating");
}

#[tokio::test]
async fn given_open_stream_when_body_dropped_then_client_released() {
    let state = create_test_app_state();
    let response = build_router(state.clone())
        .oneshot(get("/events?client_id=tab-1"))
        .await
        .unwrap();
    assert!(state.manager.has_client("tab-1").await);

    drop(response);

    assert!(!settle_has_client(&state.manager, "tab-1").await);
    assert_eq!(state.manager.metrics().await.total_connections_served, 1);
}

#[tokio::test]
async fn given_stream_replaced_when_old_body_dropped_then_new_registration_kept() {
    // Given
    let state = create_test_app_state();
    let app = build_router(state.clone());
    let first = app.clone().oneshot(get("/events?client_id=tab-1")).await.unwrap();
    let second = app.oneshot(get("/events?client_id=tab-1")).await.unwrap();

    // When
    let mut old_body = first.into_body();
    assert_eq!(event_name(&next_frame(&mut old_body).await.unwrap()), "connected");
    assert!(next_frame(&mut old_body).await.is_none(), "old stream closed");
    drop(old_body);

    // Then
    assert!(settle_has_client(&state.manager, "tab-1").await);
    assert_eq!(state.manager.client_count().await, 1);
    drop(second);
}

#[tokio::test]
async fn given_missing_or_blank_client_id_when_subscribing_then_400() {
    let state = create_test_app_state();

    for uri in ["/events", "/events?client_id=", "/events?client_id=%20%20"] {
        let response = build_router(state.clone()).oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json = json_body(response).await;
        assert_eq!(json["error"]["field"], "client_id");
    }

    assert_eq!(state.manager.client_count().await, 0);
}

#[tokio::test]
async fn given_limit_reached_when_subscribing_again_then_429() {
    // Given
    let state = create_test_app_state_with_limit(2);
    let app = build_router(state.clone());
    let _a = app.clone().oneshot(get("/events?client_id=tab-1")).await.unwrap();
    let _b = app.clone().oneshot(get("/events?client_id=tab-1")).await.unwrap();

    // When
    let response = app.clone().oneshot(get("/events?client_id=tab-1")).await.unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "RATE_LIMITED");

    // Other ids have their own budget
    let other = app.oneshot(get("/events?client_id=tab-2")).await.unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_shutdown_triggered_when_subscribing_then_503() {
    let state = create_test_app_state();
    state.shutdown.shutdown();

    let response = build_router(state.clone())
        .oneshot(get("/events?client_id=tab-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!state.manager.has_client("tab-1").await);
}

// =============================================================================
// POST /events/broadcast
// =============================================================================

#[tokio::test]
async fn given_connected_clients_when_publishing_then_every_client_receives() {
    // Given
    let state = create_test_app_state();
    let (sink_a, mut rx_a) = ChannelSink::new(8);
    let (sink_b, mut rx_b) = ChannelSink::new(8);
    state.manager.add_client("tab-a", Arc::new(sink_a)).await;
    state.manager.add_client("tab-b", Arc::new(sink_b)).await;

    // When
    let response = build_router(state.clone())
        .oneshot(post_json(
            "/events/broadcast",
            json!({ "type": "action-item:created", "payload": { "id": 7 } }),
        ))
        .await
        .unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["delivered"], 2);
    assert_eq!(json["deduplicated"], false);

    for rx in [&mut rx_a, &mut rx_b] {
        assert_eq!(event_name(&rx.recv().await.unwrap()), "connected");
        assert_eq!(event_name(&rx.recv().await.unwrap()), "action-item:created");
    }
}

#[tokio::test]
async fn given_client_id_when_publishing_then_only_that_client_receives() {
    let state = create_test_app_state();
    let (sink_a, mut rx_a) = ChannelSink::new(8);
    let (sink_b, mut rx_b) = ChannelSink::new(8);
    state.manager.add_client("tab-a", Arc::new(sink_a)).await;
    state.manager.add_client("tab-b", Arc::new(sink_b)).await;

    let response = build_router(state.clone())
        .oneshot(post_json(
            "/events/broadcast",
            json!({ "type": "minutes:failed", "client_id": "tab-b" }),
        ))
        .await
        .unwrap();

    assert_eq!(json_body(response).await["delivered"], 1);
    rx_a.recv().await.unwrap();
    rx_b.recv().await.unwrap();
    assert!(rx_a.try_recv().is_err());
    assert_eq!(event_name(&rx_b.recv().await.unwrap()), "minutes:failed");
}

#[tokio::test]
async fn given_unknown_target_when_publishing_then_zero_delivered() {
    let state = create_test_app_state();

    let response = build_router(state.clone())
        .oneshot(post_json(
            "/events/broadcast",
            json!({ "type": "meeting:ended", "client_id": "ghost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["delivered"], 0);
}

#[tokio::test]
async fn given_unknown_or_internal_type_when_publishing_then_400() {
    let state = create_test_app_state();

    for event_type in ["meeting:exploded", "heartbeat", "connected"] {
        let response = build_router(state.clone())
            .oneshot(post_json("/events/broadcast", json!({ "type": event_type })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{event_type}");
        assert_eq!(json_body(response).await["error"]["field"], "type");
    }

    assert!(state.manager.metrics().await.last_broadcast_at.is_none());
}

#[tokio::test]
async fn given_repeated_idempotency_key_when_publishing_then_sent_once() {
    // Given
    let state = create_test_app_state();
    let (sink, mut rx) = ChannelSink::new(8);
    state.manager.add_client("tab-1", Arc::new(sink)).await;
    let app = build_router(state.clone());
    let request = || {
        let mut request = post_json("/events/broadcast", json!({ "type": "meeting:started" }));
        request
            .headers_mut()
            .insert(IDEMPOTENCY_KEY_HEADER, "publish-42".parse().unwrap());
        request
    };

    // When
    let first = json_body(app.clone().oneshot(request()).await.unwrap()).await;
    let second = json_body(app.oneshot(request()).await.unwrap()).await;

    // Then
    assert_eq!(first["delivered"], 1);
    assert_eq!(first["deduplicated"], false);
    assert_eq!(second["delivered"], 1);
    assert_eq!(second["deduplicated"], true);

    assert_eq!(event_name(&rx.recv().await.unwrap()), "connected");
    assert_eq!(event_name(&rx.recv().await.unwrap()), "meeting:started");
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// GET /events/metrics
// =============================================================================

#[tokio::test]
async fn given_activity_when_reading_metrics_then_snapshot_in_camel_case() {
    let state = create_test_app_state();
    let (sink, _rx) = ChannelSink::new(8);
    state.manager.add_client("tab-1", Arc::new(sink)).await;
    state.manager.broadcast(EventType::MeetingEnded, None).await;

    let response = build_router(state.clone())
        .oneshot(get("/events/metrics"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["totalConnectionsServed"], 1);
    assert_eq!(json["activeConnections"], 1);
    assert!(json["lastBroadcastAt"].is_string());
}
