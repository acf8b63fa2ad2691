use crate::ShutdownCoordinator;

use tokio::sync::watch;

/// Waits on a [`ShutdownCoordinator`] from inside a task
pub struct ShutdownGuard {
    shutdown_rx: watch::Receiver<bool>,
}

impl ShutdownGuard {
    pub fn new(coordinator: &ShutdownCoordinator) -> Self {
        Self {
            shutdown_rx: coordinator.subscribe(),
        }
    }

    /// Resolve once shutdown has been triggered
    pub async fn wait(&mut self) {
        // Err means the coordinator is gone, which is as good as shutdown.
        let _ = self.shutdown_rx.wait_for(|triggered| *triggered).await;
    }

    /// Non-blocking check
    pub fn poll_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}
