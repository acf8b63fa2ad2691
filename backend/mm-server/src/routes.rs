use crate::{AppState, health, metrics, publish, subscribe};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Event stream endpoints
        .route("/events", get(subscribe))
        .route("/events/broadcast", post(publish))
        .route("/events/metrics", get(metrics))
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .with_state(state)
        // Browser dashboards open EventSource from another origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
