use crate::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - Component status
pub async fn health(State(state): State<AppState>) -> Response {
    let running = state.manager.is_running().await;
    let metrics = state.manager.metrics().await;
    let cache = state.publish_cache.lock().await.stats();
    let (status, broadcast) = if running {
        ("healthy", "running")
    } else {
        ("degraded", "stopped")
    };

    let health = json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "broadcast": broadcast,
            "activeConnections": metrics.active_connections,
            "totalConnectionsServed": metrics.total_connections_served,
            "publishCache": {
                "size": cache.size,
                "hits": cache.hits,
                "misses": cache.misses,
            },
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Liveness probe (is the process alive?)
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Readiness probe: heartbeat running and not shutting down
pub async fn readiness(State(state): State<AppState>) -> Response {
    if state.shutdown.is_shutdown() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Shutting down").into_response();
    }

    if !state.manager.is_running().await {
        return (StatusCode::SERVICE_UNAVAILABLE, "Broadcast manager stopped").into_response();
    }

    (StatusCode::OK, "Ready").into_response()
}
