pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod maintenance;
pub mod routes;
pub mod shutdown_coordinator;
pub mod shutdown_guard;

#[cfg(test)]
mod tests;

pub use api::{
    error::ApiError,
    error::Result as ApiResult,
    events::{
        events::{IDEMPOTENCY_KEY_HEADER, metrics, publish, subscribe},
        events_query::EventsQuery,
        publish_request::PublishRequest,
        publish_response::PublishResponse,
        stream_guard::StreamGuard,
    },
};
pub use app_state::{AppState, PublishCache};
pub use error::{Result as ServerResult, ServerError};
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;

pub use crate::routes::build_router;
