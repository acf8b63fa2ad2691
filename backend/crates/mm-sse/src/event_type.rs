use crate::SseError;

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Every event name a client can receive on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// First record on every new stream
    #[serde(rename = "connected")]
    Connected,
    /// Keep-alive, never carries a payload
    #[serde(rename = "heartbeat")]
    Heartbeat,
    #[serde(rename = "meeting:started")]
    MeetingStarted,
    #[serde(rename = "meeting:ended")]
    MeetingEnded,
    #[serde(rename = "meeting:status-changed")]
    MeetingStatusChanged,
    #[serde(rename = "minutes:generating")]
    MinutesGenerating,
    #[serde(rename = "minutes:completed")]
    MinutesCompleted,
    #[serde(rename = "minutes:failed")]
    MinutesFailed,
    #[serde(rename = "action-item:created")]
    ActionItemCreated,
    #[serde(rename = "action-item:updated")]
    ActionItemUpdated,
    #[serde(rename = "action-item:deleted")]
    ActionItemDeleted,
}

impl EventType {
    pub const ALL: [EventType; 11] = [
        EventType::Connected,
        EventType::Heartbeat,
        EventType::MeetingStarted,
        EventType::MeetingEnded,
        EventType::MeetingStatusChanged,
        EventType::MinutesGenerating,
        EventType::MinutesCompleted,
        EventType::MinutesFailed,
        EventType::ActionItemCreated,
        EventType::ActionItemUpdated,
        EventType::ActionItemDeleted,
    ];

    /// Wire name used in the `event:` line and the JSON `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Heartbeat => "heartbeat",
            Self::MeetingStarted => "meeting:started",
            Self::MeetingEnded => "meeting:ended",
            Self::MeetingStatusChanged => "meeting:status-changed",
            Self::MinutesGenerating => "minutes:generating",
            Self::MinutesCompleted => "minutes:completed",
            Self::MinutesFailed => "minutes:failed",
            Self::ActionItemCreated => "action-item:created",
            Self::ActionItemUpdated => "action-item:updated",
            Self::ActionItemDeleted => "action-item:deleted",
        }
    }

    /// Types emitted by the manager itself rather than by producers
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Connected | Self::Heartbeat)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = SseError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SseError::UnknownEventType {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
