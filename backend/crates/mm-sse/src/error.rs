use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SseError {
    #[error("Sink closed {location}")]
    SinkClosed { location: ErrorLocation },

    #[error("Send buffer full, client too slow {location}")]
    SendBufferFull { location: ErrorLocation },

    #[error("Event serialization failed: {source} {location}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Unknown event type '{value}' {location}")]
    UnknownEventType {
        value: String,
        location: ErrorLocation,
    },
}

impl SseError {
    #[track_caller]
    pub fn sink_closed() -> Self {
        Self::SinkClosed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn send_buffer_full() -> Self {
        Self::SendBufferFull {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SinkClosed { .. } => "SINK_CLOSED",
            Self::SendBufferFull { .. } => "SLOW_CLIENT",
            Self::Serialization { .. } => "ENCODE_ERROR",
            Self::UnknownEventType { .. } => "UNKNOWN_EVENT_TYPE",
        }
    }
}

impl From<serde_json::Error> for SseError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SseError>;
