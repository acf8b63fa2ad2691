use crate::ShutdownCoordinator;

use mm_core::{RateLimiter, TtlCache};
use mm_sse::BroadcastManager;

use std::sync::Arc;

use tokio::sync::Mutex;

/// Delivered counts of recent publishes, keyed by `Idempotency-Key`
pub type PublishCache = Arc<Mutex<TtlCache<String, usize>>>;

/// Shared state for every route
#[derive(Clone)]
pub struct AppState {
    pub manager: BroadcastManager,
    /// Keyed by client id, applied to stream opens
    pub rate_limiter: RateLimiter,
    pub publish_cache: PublishCache,
    pub shutdown: ShutdownCoordinator,
    /// Frames buffered per stream before the client counts as too slow
    pub send_buffer_size: usize,
}
