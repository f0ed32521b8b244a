//! Real-time transport abstraction
//!
//! One connection is shared by every view. Views receive it as a
//! [`SharedTransport`] and only ever subscribe; connection management
//! (reconnects, backoff) belongs to the implementation behind the trait.

use serde_json::Value;
use shared::realtime::{EventName, RealtimeEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Default broadcast buffer per subscriber
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Source of named real-time events
pub trait RealtimeTransport: Send + Sync + std::fmt::Debug {
    /// Subscribe to every event published after this call
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent>;

    /// Whether the underlying connection is currently up
    fn is_connected(&self) -> bool;
}

/// Capability handed to views
pub type SharedTransport = Arc<dyn RealtimeTransport>;

/// In-process transport backed by a broadcast channel
///
/// Used when events are produced in the same process (bridges from another
/// socket library, replay tools, tests).
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    tx: broadcast::Sender<RealtimeEvent>,
    connected: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Publish an event; returns how many subscribers received it
    pub fn publish(&self, name: impl Into<EventName>, payload: Value) -> usize {
        self.publish_event(RealtimeEvent::new(name, payload))
    }

    pub fn publish_event(&self, event: RealtimeEvent) -> usize {
        tracing::trace!(event = %event.name, "Publishing real-time event");
        // No subscribers is not an error: the event is simply dropped
        self.tx.send(event).unwrap_or(0)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Erase the concrete type for injection into views
    pub fn shared(&self) -> SharedTransport {
        Arc::new(self.clone())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeTransport for MemoryTransport {
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
