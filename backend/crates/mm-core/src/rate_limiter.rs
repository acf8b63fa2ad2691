use crate::{CoreError, Result as CoreErrorResult};

use std::num::NonZeroU32;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use error_location::ErrorLocation;
use governor::{
    Quota, RateLimiter as KeyedLimiter, clock::DefaultClock,
    state::keyed::DefaultKeyedStateStore,
};

/// Per-key request limiter.
///
/// Each key may burst up to `max_requests`; capacity then refills one
/// request every `window / max_requests`, so a key never exceeds
/// `max_requests` within any window-length span after its burst is spent.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<KeyedLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>>,
    max_requests: u32,
    window_secs: u64,
}

impl RateLimiter {
    #[track_caller]
    pub fn new(max_requests: u32, window_secs: u64) -> CoreErrorResult<Self> {
        let burst = NonZeroU32::new(max_requests).ok_or_else(|| CoreError::InvalidConfig {
            message: String::from("max_requests must be greater than zero"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if window_secs == 0 {
            return Err(CoreError::InvalidConfig {
                message: String::from("window_secs must be greater than zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let period = Duration::from_secs(window_secs) / max_requests;
        let quota = Quota::with_period(period)
            .ok_or_else(|| CoreError::InvalidConfig {
                message: format!(
                    "{} requests per {}s yields a zero replenish period",
                    max_requests, window_secs
                ),
                location: ErrorLocation::from(Location::caller()),
            })?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(KeyedLimiter::keyed(quota)),
            max_requests,
            window_secs,
        })
    }

    /// Check if a request for `key` is allowed, returns error if rate limited
    #[track_caller]
    pub fn check(&self, key: &str) -> CoreErrorResult<()> {
        self.limiter
            .check_key(&key.to_string())
            .map_err(|_| {
                log::debug!("Rate limit hit for key {key}");
                CoreError::RateLimitExceeded {
                    key: key.to_string(),
                    limit: self.max_requests,
                    window_secs: self.window_secs,
                    location: ErrorLocation::from(Location::caller()),
                }
            })
    }

    /// Drop state for keys whose capacity has fully refilled
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }
}
