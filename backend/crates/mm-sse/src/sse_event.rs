use crate::{EventType, Result as SseResult};

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// One record pushed to clients.
///
/// Framed on the wire as
/// `event: <type>\ndata: {"type":..,"payload":..,"timestamp":..}\n\n`.
/// The `payload` key is omitted when there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SseEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl SseEvent {
    /// Stamp a new event with the current time
    pub fn new(event_type: EventType, payload: Option<serde_json::Value>) -> Self {
        Self {
            event_type,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn heartbeat() -> Self {
        Self::new(EventType::Heartbeat, None)
    }

    /// JSON body of the `data:` line
    pub fn to_json(&self) -> SseResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Complete wire record, including the terminating blank line
    pub fn to_frame(&self) -> SseResult<Bytes> {
        let data = self.to_json()?;
        Ok(Bytes::from(format!(
            "event: {}\ndata: {}\n\n",
            self.event_type, data
        )))
    }
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
