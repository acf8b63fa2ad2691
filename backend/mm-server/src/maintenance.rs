//! Background housekeeping for per-request state that would otherwise only
//! shrink on access.

use crate::AppState;

use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Every `period`, drop idle rate-limit keys and expired publish-cache
/// entries. Ends when shutdown is triggered.
pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown = state.shutdown.subscribe_guard();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = ticker.tick() => sweep(&state).await,
            }
        }

        debug!("Maintenance task stopped");
    })
}

/// One housekeeping pass
pub async fn sweep(state: &AppState) {
    state.rate_limiter.retain_recent();
    let purged = state.publish_cache.lock().await.purge_expired();

    debug!(
        "Maintenance: {} rate-limit keys tracked, {purged} cache entries purged",
        state.rate_limiter.tracked_keys()
    );
}
