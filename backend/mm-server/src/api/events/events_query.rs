use serde::Deserialize;

/// Query string of `GET /events`
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Missing is reported the same way as empty
    #[serde(default)]
    pub client_id: String,
}
