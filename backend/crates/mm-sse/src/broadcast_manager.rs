use crate::{
    BroadcastConfig, BroadcastMetrics, ClientConnection, EventType, Metrics, Sink, SseEvent,
};

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1);
const MAX_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(86_400);

/// Registry of open event streams plus the heartbeat / idle-eviction task.
///
/// Cloning yields another handle to the same registry. Every operation is
/// safe to call concurrently; sink writes never block, so a slow or dead
/// client costs one failed `write` and is evicted on the spot.
#[derive(Clone)]
pub struct BroadcastManager {
    shared: Arc<Shared>,
}

struct Shared {
    registry: RwLock<RegistryInner>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
    config: BroadcastConfig,
    metrics: Metrics,
}

struct RegistryInner {
    clients: HashMap<String, ClientConnection>,
    /// Registration sequence -> id; fan-out visits clients in this order
    order: BTreeMap<u64, String>,
    next_sequence: u64,
    total_connections_served: u64,
    last_broadcast_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
enum RemovalReason {
    Removed,
    Replaced,
    WriteFailed,
    IdleTimeout,
    Shutdown,
}

impl RemovalReason {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::Replaced => "replaced",
            Self::WriteFailed => "write_failed",
            Self::IdleTimeout => "idle_timeout",
            Self::Shutdown => "shutdown",
        }
    }
}

impl RegistryInner {
    /// Close and drop one entry. Returns whether it existed.
    fn remove(&mut self, id: &str, reason: RemovalReason, metrics: &Metrics) -> bool {
        let Some(connection) = self.clients.remove(id) else {
            return false;
        };
        self.order.remove(&connection.sequence);

        connection.close();
        metrics.connection_closed(reason.as_str(), self.clients.len());

        let connected_secs = connection.connected_for().num_seconds();
        match reason {
            RemovalReason::WriteFailed => debug!(
                "Dropped client {id} after failed write, connected {connected_secs}s ({} active)",
                self.clients.len()
            ),
            _ => info!(
                "Unregistered client {id}: {}, connected {connected_secs}s ({} active)",
                reason.as_str(),
                self.clients.len()
            ),
        }

        true
    }

    fn insert(&mut self, id: String, sink: Arc<dyn Sink>) -> &ClientConnection {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.order.insert(sequence, id.clone());

        self.clients
            .entry(id.clone())
            .insert_entry(ClientConnection::new(id, sequence, sink))
            .into_mut()
    }

    /// Live connections, oldest registration first
    fn in_order(&self) -> impl Iterator<Item = &ClientConnection> {
        self.order.values().filter_map(|id| self.clients.get(id))
    }
}

impl BroadcastManager {
    /// Create a stopped manager with an empty registry
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: RwLock::new(RegistryInner {
                    clients: HashMap::new(),
                    order: BTreeMap::new(),
                    next_sequence: 0,
                    total_connections_served: 0,
                    last_broadcast_at: None,
                }),
                heartbeat: Mutex::new(None),
                config,
                metrics: Metrics::new(),
            }),
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.shared.config
    }

    /// Register a client, replacing (and closing) any existing entry with
    /// the same id. The `connected` event is written before the registry
    /// lock is released, so it is always the first frame the client sees.
    pub async fn add_client(&self, id: impl Into<String>, sink: Arc<dyn Sink>) {
        let id = id.into();
        let metrics = &self.shared.metrics;
        let mut inner = self.shared.registry.write().await;

        inner.remove(&id, RemovalReason::Replaced, metrics);

        let connected = SseEvent::new(EventType::Connected, Some(json!({ "clientId": id })));
        let connection = inner.insert(id.clone(), sink);
        if let Some(frame) = encode(&connected) {
            match connection.sink.write(frame) {
                Ok(()) => metrics.event_sent(EventType::Connected),
                // Left registered; the next failed write evicts it.
                Err(e) => debug!("Initial write to client {id} failed: {e}"),
            }
        }

        inner.total_connections_served += 1;
        metrics.connection_established(inner.clients.len());

        info!(
            "Registered client {id} ({} active, {} served)",
            inner.clients.len(),
            inner.total_connections_served
        );
    }

    /// Close and unregister a client. Returns false for unknown ids.
    pub async fn remove_client(&self, id: &str) -> bool {
        let mut inner = self.shared.registry.write().await;
        inner.remove(id, RemovalReason::Removed, &self.shared.metrics)
    }

    /// Unregister `id` only while it is still backed by `sink`.
    ///
    /// Used by transports on disconnect so that a stream torn down after
    /// its id was re-registered does not remove the newer connection.
    pub async fn release_client(&self, id: &str, sink: &Arc<dyn Sink>) -> bool {
        let mut inner = self.shared.registry.write().await;

        let current = inner
            .clients
            .get(id)
            .is_some_and(|connection| connection.holds_sink(sink));

        current && inner.remove(id, RemovalReason::Removed, &self.shared.metrics)
    }

    pub async fn has_client(&self, id: &str) -> bool {
        let inner = self.shared.registry.read().await;
        inner.clients.contains_key(id)
    }

    pub async fn client_count(&self) -> usize {
        let inner = self.shared.registry.read().await;
        inner.clients.len()
    }

    /// Write one event to every registered client.
    ///
    /// Clients whose sink rejects the write are evicted; the rest still
    /// receive it. Returns how many sinks accepted the frame. Zero is a
    /// normal outcome, not an error.
    pub async fn broadcast(
        &self,
        event_type: EventType,
        payload: Option<serde_json::Value>,
    ) -> usize {
        let metrics = &self.shared.metrics;
        let event = SseEvent::new(event_type, payload);
        let mut inner = self.shared.registry.write().await;

        inner.last_broadcast_at = Some(event.timestamp);

        let Some(frame) = encode(&event) else {
            return 0;
        };

        let mut delivered = 0;
        let mut failed = Vec::new();

        for connection in inner.in_order() {
            let id = &connection.id;
            match connection.sink.write(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    metrics.event_sent(event_type);
                }
                Err(e) => {
                    debug!("Broadcast {event_type} to client {id} failed: {e}");
                    metrics.write_failed(e.error_code());
                    failed.push(id.clone());
                }
            }
        }

        for id in &failed {
            inner.remove(id, RemovalReason::WriteFailed, metrics);
        }

        metrics.broadcast_published(event_type, delivered);
        debug!(
            "Broadcast {event_type} delivered to {delivered} clients ({} dropped)",
            failed.len()
        );

        delivered
    }

    /// Write one event to a single client.
    ///
    /// Returns false for an unknown id (nothing happens) or when the write
    /// fails (the client is evicted).
    pub async fn send_to_client(
        &self,
        id: &str,
        event_type: EventType,
        payload: Option<serde_json::Value>,
    ) -> bool {
        let metrics = &self.shared.metrics;
        let mut inner = self.shared.registry.write().await;

        let Some(connection) = inner.clients.get(id) else {
            debug!("Send {event_type} skipped: client {id} not registered");
            return false;
        };

        let Some(frame) = encode(&SseEvent::new(event_type, payload)) else {
            return false;
        };

        let result = connection.sink.write(frame);

        match result {
            Ok(()) => {
                metrics.event_sent(event_type);
                true
            }
            Err(e) => {
                debug!("Send {event_type} to client {id} failed: {e}");
                metrics.write_failed(e.error_code());
                inner.remove(id, RemovalReason::WriteFailed, metrics);
                false
            }
        }
    }

    /// Start the heartbeat / idle-eviction task. No-op while running.
    pub async fn start(&self) {
        let mut heartbeat = self.shared.heartbeat.lock().await;

        if heartbeat.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("Broadcast manager already running");
            return;
        }

        let period = self
            .shared
            .config
            .heartbeat_interval
            .clamp(MIN_HEARTBEAT_INTERVAL, MAX_HEARTBEAT_INTERVAL);
        if period != self.shared.config.heartbeat_interval {
            warn!(
                "Heartbeat interval {:?} out of range, using {:?}",
                self.shared.config.heartbeat_interval, period
            );
        }
        let first_tick = Instant::now() + period;
        *heartbeat = Some(tokio::spawn(run_heartbeat(
            Arc::downgrade(&self.shared),
            first_tick,
            period,
        )));

        info!(
            "Broadcast manager started: heartbeat={:?}, idle_timeout={:?}",
            period, self.shared.config.idle_timeout
        );
    }

    /// Cancel the heartbeat task, then close and remove every client.
    /// Safe to call repeatedly.
    pub async fn stop(&self) {
        if let Some(task) = self.shared.heartbeat.lock().await.take() {
            task.abort();
            info!("Broadcast manager heartbeat stopped");
        }

        let metrics = &self.shared.metrics;
        let mut inner = self.shared.registry.write().await;
        let closed: Vec<ClientConnection> = inner.clients.drain().map(|(_, c)| c).collect();
        inner.order.clear();

        for connection in &closed {
            connection.close();
            metrics.connection_closed(RemovalReason::Shutdown.as_str(), 0);
        }

        if !closed.is_empty() {
            info!("Disconnected {} clients on stop", closed.len());
        }
    }

    pub async fn is_running(&self) -> bool {
        self.shared
            .heartbeat
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Snapshot of the running counters
    pub async fn metrics(&self) -> BroadcastMetrics {
        let inner = self.shared.registry.read().await;
        BroadcastMetrics {
            total_connections_served: inner.total_connections_served,
            active_connections: inner.clients.len(),
            last_broadcast_at: inner.last_broadcast_at,
        }
    }

    /// Evict every client idle for longer than the configured timeout
    pub(crate) async fn evict_idle_clients(&self) -> usize {
        let now = Instant::now();
        let timeout = self.shared.config.idle_timeout;
        let mut inner = self.shared.registry.write().await;

        let idle: Vec<String> = inner
            .in_order()
            .filter(|connection| connection.idle_for(now) > timeout)
            .map(|connection| connection.id.clone())
            .collect();

        for id in &idle {
            inner.remove(id, RemovalReason::IdleTimeout, &self.shared.metrics);
        }

        idle.len()
    }

    async fn heartbeat_tick(&self) {
        let delivered = self.broadcast(EventType::Heartbeat, None).await;
        let evicted = self.evict_idle_clients().await;

        debug!("Heartbeat tick: {delivered} delivered, {evicted} idle evicted");
    }
}

impl Default for BroadcastManager {
    fn default() -> Self {
        Self::new(BroadcastConfig::default())
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(task) = self.heartbeat.get_mut().take() {
            task.abort();
        }
    }
}

/// Holds only a weak reference so a dropped manager ends the task.
async fn run_heartbeat(shared: Weak<Shared>, first_tick: Instant, period: Duration) {
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let Some(shared) = shared.upgrade() else {
            break;
        };

        BroadcastManager { shared }.heartbeat_tick().await;
    }
}

fn encode(event: &SseEvent) -> Option<Bytes> {
    match event.to_frame() {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("Failed to encode {} event: {e}", event.event_type);
            None
        }
    }
}
