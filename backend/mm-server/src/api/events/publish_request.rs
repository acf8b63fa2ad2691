use serde::Deserialize;

/// Body of `POST /events/broadcast`
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Wire name, e.g. `minutes:completed`
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    /// Targeted send when present, broadcast otherwise
    #[serde(default)]
    pub client_id: Option<String>,
}
