use crate::Sink;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// A registered subscriber
pub struct ClientConnection {
    pub id: String,
    pub sink: Arc<dyn Sink>,
    /// Set on registration only; the idle sweep measures from here
    pub last_activity: Instant,
    pub connected_at: DateTime<Utc>,
    /// Registration order within the manager
    pub sequence: u64,
}

impl ClientConnection {
    pub fn new(id: String, sequence: u64, sink: Arc<dyn Sink>) -> Self {
        Self {
            id,
            sink,
            last_activity: Instant::now(),
            connected_at: Utc::now(),
            sequence,
        }
    }

    /// Wall-clock time since registration
    pub fn connected_for(&self) -> TimeDelta {
        Utc::now() - self.connected_at
    }

    pub fn idle_for(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Close the sink, ignoring failures from an already-dead transport
    pub fn close(&self) {
        if let Err(e) = self.sink.close() {
            log::trace!("Ignoring close failure for client {}: {}", self.id, e);
        }
    }

    pub fn holds_sink(&self, sink: &Arc<dyn Sink>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.sink), Arc::as_ptr(sink))
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("last_activity", &self.last_activity)
            .field("connected_at", &self.connected_at)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
