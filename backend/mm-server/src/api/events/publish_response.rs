use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PublishResponse {
    /// Sinks that accepted the frame
    pub delivered: usize,
    /// True when an earlier publish with the same `Idempotency-Key` was
    /// answered instead of sending again
    pub deduplicated: bool,
}
