//! Event stream REST handlers
//!
//! `GET /events` holds a response open and streams SSE frames to one browser
//! tab. `POST /events/broadcast` is how the rest of the application publishes.

use crate::{
    ApiError, ApiResult, AppState, EventsQuery, PublishRequest, PublishResponse, StreamGuard,
};

use mm_sse::{BroadcastManager, BroadcastMetrics, ChannelSink, EventType, Sink};

use std::convert::Infallible;
use std::panic::Location;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use bytes::Bytes;
use error_location::ErrorLocation;
use futures::{Stream, stream};
use log::{debug, info};
use tokio::sync::mpsc;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

// =============================================================================
// Handlers
// =============================================================================

/// GET /events?client_id=<id>
///
/// Register the caller as `client_id` and stream events until it
/// disconnects, is replaced by a newer stream with the same id, or is
/// evicted.
pub async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Response> {
    let client_id = query.client_id.trim();
    if client_id.is_empty() {
        return Err(ApiError::validation("client_id is required", "client_id"));
    }

    if state.shutdown.is_shutdown() {
        return Err(ApiError::Unavailable {
            message: "Server is shutting down".into(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    state.rate_limiter.check(client_id)?;

    let (sink, rx) = ChannelSink::new(state.send_buffer_size);
    let sink: Arc<dyn Sink> = Arc::new(sink);
    state.manager.add_client(client_id, Arc::clone(&sink)).await;

    let guard = StreamGuard::new(state.manager.clone(), client_id.to_string(), sink);
    info!("Event stream opened for client {client_id}");

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", HeaderValue::from_static("no"))
        .body(Body::from_stream(frames(rx, guard)))
        .map_err(|e| ApiError::internal(format!("Failed to build event stream: {e}")))
}

/// POST /events/broadcast
///
/// Publish one application event, to a single client when `client_id` is
/// given and to every connected client otherwise. A repeated
/// `Idempotency-Key` within the cache TTL returns the first result without
/// sending again.
pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let event_type = EventType::from_str(&request.event_type)?;
    if event_type.is_internal() {
        return Err(ApiError::validation(
            format!("'{event_type}' is reserved for the event stream itself"),
            "type",
        ));
    }

    if request.client_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        return Err(ApiError::validation("client_id must not be empty", "client_id"));
    }

    let Some(key) = idempotency_key(&headers)? else {
        let delivered = send(&state.manager, event_type, request).await;
        return Ok(Json(PublishResponse {
            delivered,
            deduplicated: false,
        }));
    };

    // Held across the send so concurrent retries with one key publish once.
    let mut cache = state.publish_cache.lock().await;

    if let Some(delivered) = cache.get(&key) {
        debug!("Publish with idempotency key {key} already answered");
        return Ok(Json(PublishResponse {
            delivered,
            deduplicated: true,
        }));
    }

    let delivered = send(&state.manager, event_type, request).await;
    cache.insert(key, delivered);

    Ok(Json(PublishResponse {
        delivered,
        deduplicated: false,
    }))
}

/// GET /events/metrics
pub async fn metrics(State(state): State<AppState>) -> Json<BroadcastMetrics> {
    Json(state.manager.metrics().await)
}

// =============================================================================
// Helpers
// =============================================================================

async fn send(manager: &BroadcastManager, event_type: EventType, request: PublishRequest) -> usize {
    match request.client_id {
        Some(id) => usize::from(manager.send_to_client(id.trim(), event_type, request.payload).await),
        None => manager.broadcast(event_type, request.payload).await,
    }
}

fn idempotency_key(headers: &HeaderMap) -> ApiResult<Option<String>> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .map(str::trim)
        .map_err(|_| ApiError::validation("Idempotency-Key must be ASCII", "Idempotency-Key"))?;

    if key.is_empty() || key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ApiError::validation(
            format!("Idempotency-Key must be 1-{MAX_IDEMPOTENCY_KEY_LEN} characters"),
            "Idempotency-Key",
        ));
    }

    Ok(Some(key.to_string()))
}

/// Response body: the sink's frames, in order, until the sink is closed.
/// The guard rides along so dropping the body releases the client.
fn frames(
    rx: mpsc::Receiver<Bytes>,
    guard: StreamGuard,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
    stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let frame = rx.recv().await?;
        Some((Ok(frame), (rx, guard)))
    })
}
