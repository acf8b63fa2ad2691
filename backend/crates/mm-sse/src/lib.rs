pub mod broadcast_config;
pub mod broadcast_manager;
pub mod broadcast_metrics;
pub mod channel_sink;
pub mod client_connection;
pub mod error;
pub mod event_type;
pub mod global_manager;
pub mod metrics;
pub mod sink;
pub mod sse_event;

pub use broadcast_config::BroadcastConfig;
pub use broadcast_manager::BroadcastManager;
pub use broadcast_metrics::BroadcastMetrics;
pub use channel_sink::ChannelSink;
pub use client_connection::ClientConnection;
pub use error::{Result, SseError};
pub use event_type::EventType;
pub use global_manager::{configure_manager, get_manager, reset_manager};
pub use metrics::Metrics;
pub use sink::Sink;
pub use sse_event::SseEvent;

#[cfg(test)]
mod tests;
