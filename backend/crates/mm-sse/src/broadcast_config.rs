use std::time::Duration;

/// Timing for the heartbeat / idle-eviction task
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Period between heartbeat ticks
    pub heartbeat_interval: Duration,
    /// Clients idle longer than this are evicted on the next tick
    pub idle_timeout: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl BroadcastConfig {
    pub fn new(heartbeat_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            heartbeat_interval,
            idle_timeout,
        }
    }
}
