//! Subscriber hub
//!
//! Fans verification events out to long-lived WebSocket subscribers. A single
//! event-loop task owns the subscriber set; registrations, unregistrations and
//! broadcasts all flow through its channels, so membership mutation is
//! serialized by construction. Slow subscribers are shed, never waited on.

pub mod events;
pub mod routes;
pub mod subscriber;

pub use events::{AuditResultPayload, ClaimPayload, Envelope};
pub use routes::create_hub_router;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::stats::GatewayStats;

/// Capacity of the hub's own input channels. Producers block briefly when the
/// event loop falls behind; subscriber buffers are where shedding happens.
const INPUT_CHANNEL_CAPACITY: usize = 1024;

struct Registration {
    id: String,
    buffer: mpsc::Sender<String>,
}

/// Cloneable handle for talking to the hub event loop.
#[derive(Clone)]
pub struct HubHandle {
    register_tx: mpsc::Sender<Registration>,
    unregister_tx: mpsc::Sender<String>,
    broadcast_tx: mpsc::Sender<Envelope>,
    publish_tx: mpsc::Sender<String>,
    shutdown_tx: mpsc::Sender<()>,
    subscriber_count: Arc<AtomicUsize>,
}

impl HubHandle {
    /// Hand a new subscriber's outbound buffer to the event loop.
    pub async fn register(&self, id: String, buffer: mpsc::Sender<String>) {
        let _ = self.register_tx.send(Registration { id, buffer }).await;
    }

    /// Channel used by the pumps to report a dead connection.
    pub fn unregister_sender(&self) -> mpsc::Sender<String> {
        self.unregister_tx.clone()
    }

    /// Queue a typed event for fan-out.
    pub async fn broadcast(&self, event: Envelope) {
        let _ = self.broadcast_tx.send(event).await;
    }

    /// Queue an already-serialized event for fan-out.
    pub async fn publish_json(&self, json: String) {
        let _ = self.publish_tx.send(json).await;
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::Relaxed)
    }

    /// Ask the event loop to drop every subscriber and exit.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// The hub event loop. Created together with its handle; run it on its own
/// task via [`Hub::run`].
pub struct Hub {
    register_rx: mpsc::Receiver<Registration>,
    unregister_rx: mpsc::Receiver<String>,
    broadcast_rx: mpsc::Receiver<Envelope>,
    publish_rx: mpsc::Receiver<String>,
    shutdown_rx: mpsc::Receiver<()>,
    subscribers: HashMap<String, mpsc::Sender<String>>,
    subscriber_count: Arc<AtomicUsize>,
    stats: GatewayStats,
}

impl Hub {
    pub fn new(stats: GatewayStats) -> (HubHandle, Hub) {
        let (register_tx, register_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let (unregister_tx, unregister_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let (publish_tx, publish_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let subscriber_count = Arc::new(AtomicUsize::new(0));

        let handle = HubHandle {
            register_tx,
            unregister_tx,
            broadcast_tx,
            publish_tx,
            shutdown_tx,
            subscriber_count: subscriber_count.clone(),
        };

        let hub = Hub {
            register_rx,
            unregister_rx,
            broadcast_rx,
            publish_rx,
            shutdown_rx,
            subscribers: HashMap::new(),
            subscriber_count,
            stats,
        };

        (handle, hub)
    }

    /// Run the event loop until shutdown.
    pub async fn run(mut self) {
        info!("subscriber hub started");
        loop {
            tokio::select! {
                Some(registration) = self.register_rx.recv() => {
                    self.handle_register(registration);
                }
                Some(id) = self.unregister_rx.recv() => {
                    self.handle_unregister(&id);
                }
                Some(event) = self.broadcast_rx.recv() => {
                    self.fan_out(&event.to_json());
                }
                Some(json) = self.publish_rx.recv() => {
                    self.fan_out(&json);
                }
                _ = self.shutdown_rx.recv() => {
                    break;
                }
            }
        }

        // Dropping the buffer senders ends every write pump with a close frame.
        let remaining = self.subscribers.len();
        self.subscribers.clear();
        self.subscriber_count.store(0, Ordering::Relaxed);
        info!(dropped_subscribers = remaining, "subscriber hub stopped");
    }

    fn handle_register(&mut self, registration: Registration) {
        let welcome = Envelope::connected(&registration.id).to_json();
        if registration.buffer.try_send(welcome).is_err() {
            // Connection died between upgrade and registration.
            warn!(subscriber = %registration.id, "subscriber gone before welcome");
            return;
        }
        debug!(subscriber = %registration.id, "subscriber registered");
        self.subscribers.insert(registration.id, registration.buffer);
        self.subscriber_count
            .store(self.subscribers.len(), Ordering::Relaxed);
    }

    fn handle_unregister(&mut self, id: &str) {
        if self.subscribers.remove(id).is_some() {
            debug!(subscriber = %id, "subscriber unregistered");
            self.subscriber_count
                .store(self.subscribers.len(), Ordering::Relaxed);
        }
    }

    /// Serialize-once fan-out. A full buffer evicts its subscriber on the
    /// spot; the hub never waits for a slow consumer.
    fn fan_out(&mut self, json: &str) {
        let mut evicted = Vec::new();

        for (id, buffer) in &self.subscribers {
            match buffer.try_send(json.to_string()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber = %id, "outbound buffer full, evicting subscriber");
                    self.stats.inc_subscribers_evicted();
                    evicted.push(id.clone());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    evicted.push(id.clone());
                }
            }
        }

        for id in evicted {
            self.subscribers.remove(&id);
        }
        self.subscriber_count
            .store(self.subscribers.len(), Ordering::Relaxed);
        self.stats.inc_events_broadcast();
    }
}
