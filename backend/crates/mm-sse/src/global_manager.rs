//! Process-wide manager instance for request handlers that have no owner
//! for long-lived state.
//!
//! The instance is created and started lazily by [`get_manager`].
//! [`reset_manager`] stops it and forgets it; only shutdown paths and tests
//! should call it.

use crate::{BroadcastConfig, BroadcastManager};

use log::info;
use tokio::sync::Mutex;

struct GlobalSlot {
    manager: Option<BroadcastManager>,
    config: Option<BroadcastConfig>,
}

static GLOBAL: Mutex<GlobalSlot> = Mutex::const_new(GlobalSlot {
    manager: None,
    config: None,
});

/// Get the shared manager, creating and starting it on first use
pub async fn get_manager() -> BroadcastManager {
    let mut slot = GLOBAL.lock().await;

    if let Some(manager) = &slot.manager {
        return manager.clone();
    }

    let manager = BroadcastManager::new(slot.config.clone().unwrap_or_default());
    manager.start().await;
    slot.manager = Some(manager.clone());

    info!("Created process-wide broadcast manager");
    manager
}

/// Set the config used the next time [`get_manager`] creates an instance.
/// An instance that already exists keeps its config.
pub async fn configure_manager(config: BroadcastConfig) {
    GLOBAL.lock().await.config = Some(config);
}

/// Stop the shared manager (disconnecting every client) and forget it
pub async fn reset_manager() {
    let previous = GLOBAL.lock().await.manager.take();

    if let Some(manager) = previous {
        manager.stop().await;
        info!("Process-wide broadcast manager reset");
    }
}
