use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

// Heartbeat interval constraints (seconds)
pub const MIN_HEARTBEAT_INTERVAL_SECS: u64 = 1;
pub const MAX_HEARTBEAT_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

// Idle timeout constraints (seconds)
pub const MIN_IDLE_TIMEOUT_SECS: u64 = 1;
pub const MAX_IDLE_TIMEOUT_SECS: u64 = 86_400;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

// Per-client send buffer constraints (frames)
pub const MIN_SEND_BUFFER_SIZE: usize = 1;
pub const MAX_SEND_BUFFER_SIZE: usize = 10_000;
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 64;

/// Event stream settings.
/// Idle eviction runs on the heartbeat tick, so the timeout is enforced
/// with heartbeat-interval resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Heartbeat interval in seconds
    pub heartbeat_interval_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Frames buffered per client before writes start failing
    pub send_buffer_size: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            send_buffer_size: DEFAULT_SEND_BUFFER_SIZE,
        }
    }
}

impl BroadcastConfig {
    /// Validate all fields are within acceptable ranges.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.heartbeat_interval_secs < MIN_HEARTBEAT_INTERVAL_SECS
            || self.heartbeat_interval_secs > MAX_HEARTBEAT_INTERVAL_SECS
        {
            return Err(ConfigError::broadcast(format!(
                "broadcast.heartbeat_interval_secs must be {}-{}, got {}",
                MIN_HEARTBEAT_INTERVAL_SECS,
                MAX_HEARTBEAT_INTERVAL_SECS,
                self.heartbeat_interval_secs
            )));
        }

        if self.idle_timeout_secs < MIN_IDLE_TIMEOUT_SECS
            || self.idle_timeout_secs > MAX_IDLE_TIMEOUT_SECS
        {
            return Err(ConfigError::broadcast(format!(
                "broadcast.idle_timeout_secs must be {}-{}, got {}",
                MIN_IDLE_TIMEOUT_SECS, MAX_IDLE_TIMEOUT_SECS, self.idle_timeout_secs
            )));
        }

        if self.idle_timeout_secs < self.heartbeat_interval_secs {
            return Err(ConfigError::broadcast(format!(
                "broadcast.idle_timeout_secs ({}) must not be less than heartbeat_interval_secs ({})",
                self.idle_timeout_secs, self.heartbeat_interval_secs
            )));
        }

        if self.send_buffer_size < MIN_SEND_BUFFER_SIZE
            || self.send_buffer_size > MAX_SEND_BUFFER_SIZE
        {
            return Err(ConfigError::broadcast(format!(
                "broadcast.send_buffer_size must be {}-{}, got {}",
                MIN_SEND_BUFFER_SIZE, MAX_SEND_BUFFER_SIZE, self.send_buffer_size
            )));
        }

        Ok(())
    }
}
