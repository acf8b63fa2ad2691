use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of the manager's counters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMetrics {
    /// Every registration ever made, replacements included
    pub total_connections_served: u64,
    pub active_connections: usize,
    pub last_broadcast_at: Option<DateTime<Utc>>,
}
