use crate::EventType;

use metrics::{counter, gauge};

/// Metrics collector for event stream operations
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "mm_sse" }
    }

    /// Record client registered
    pub fn connection_established(&self, active: usize) {
        counter!(format!("{}.connections.established", self.prefix)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).set(active as f64);
    }

    /// Record client removed, by reason
    pub fn connection_closed(&self, reason: &str, active: usize) {
        counter!(format!("{}.connections.closed", self.prefix)).increment(1);
        counter!(format!("{}.connections.closed.{}", self.prefix, reason)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).set(active as f64);
    }

    /// Record one event delivered to one client
    pub fn event_sent(&self, event_type: EventType) {
        counter!(format!("{}.events.sent", self.prefix)).increment(1);
        counter!(format!("{}.events.sent.{}", self.prefix, event_type)).increment(1);
    }

    /// Record a fan-out and how many clients accepted it
    pub fn broadcast_published(&self, event_type: EventType, delivered: usize) {
        counter!(format!("{}.broadcast.published", self.prefix)).increment(1);
        counter!(format!("{}.broadcast.published.{}", self.prefix, event_type)).increment(1);
        gauge!(format!("{}.broadcast.last_delivered", self.prefix)).set(delivered as f64);
    }

    /// Record a client dropped because its sink rejected a write
    pub fn write_failed(&self, error_code: &str) {
        counter!(format!("{}.errors.write", self.prefix)).increment(1);
        counter!(format!("{}.errors.write.{}", self.prefix, error_code)).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
