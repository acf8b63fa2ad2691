use mm_sse::{BroadcastManager, Sink};

use std::sync::Arc;

use log::debug;

/// Owned by an SSE response body. Dropping it (client went away or the
/// stream ended) unregisters the client, but only while the registry still
/// holds this guard's sink.
pub struct StreamGuard {
    manager: BroadcastManager,
    client_id: String,
    sink: Arc<dyn Sink>,
}

impl StreamGuard {
    pub fn new(manager: BroadcastManager, client_id: String, sink: Arc<dyn Sink>) -> Self {
        Self {
            manager,
            client_id,
            sink,
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime to release client {}", self.client_id);
            return;
        };

        let manager = self.manager.clone();
        let client_id = std::mem::take(&mut self.client_id);
        let sink = Arc::clone(&self.sink);

        runtime.spawn(async move {
            if manager.release_client(&client_id, &sink).await {
                debug!("Stream for client {client_id} dropped");
            }
        });
    }
}
