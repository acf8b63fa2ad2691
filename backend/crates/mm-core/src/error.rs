use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Rate limit exceeded for '{key}': {limit} requests per {window_secs}s {location}")]
    RateLimitExceeded {
        key: String,
        limit: u32,
        window_secs: u64,
        location: ErrorLocation,
    },

    #[error("Invalid configuration: {message} {location}")]
    InvalidConfig {
        message: String,
        location: ErrorLocation,
    },
}

impl CoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "RATE_LIMITED",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
