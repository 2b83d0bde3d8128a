//! # Publishing
//!
//! [`EventPublisher`] is the port components publish through;
//! [`InMemoryEventBus`] is the only implementation.

use crate::events::{BridgeEvent, EventFilter};
use crate::subscriber::{FilterCounts, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Fire-and-forget publishing.
///
/// Never blocks and never fails. An event nobody is subscribed to is
/// dropped.
pub trait EventPublisher: Send + Sync {
    /// Returns how many subscriptions the event reached before filtering.
    fn publish(&self, event: BridgeEvent) -> usize;

    /// Events handed to [`Self::publish`] since creation, delivered or not.
    fn events_published(&self) -> u64;
}

/// Broadcast-channel bus shared by every component in the process.
///
/// Each subscription buffers up to `capacity` events. Past that the
/// oldest are overwritten for that subscription only; the publisher is
/// never slowed down.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<BridgeEvent>,
    counts: FilterCounts,
    published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            counts: FilterCounts::default(),
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Start receiving events accepted by `filter`.
    ///
    /// Delivery starts with the next publish; nothing is replayed.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let key = filter_key(&filter);
        *self.counts.lock().entry(key.clone()).or_insert(0) += 1;
        debug!(kinds = %key, "Subscribed");

        Subscription::new(self.sender.subscribe(), filter, Arc::clone(&self.counts), key)
    }

    /// Live subscriptions of any filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Live subscriptions created with exactly this filter.
    #[must_use]
    pub fn subscriptions_for(&self, filter: &EventFilter) -> usize {
        self.counts
            .lock()
            .get(&filter_key(filter))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn filter_key(filter: &EventFilter) -> String {
    format!("{:?}", filter.kinds)
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: BridgeEvent) -> usize {
        let kind = event.kind().wire_name();
        self.published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(reached) => {
                trace!(kind, reached, "Event published");
                reached
            }
            Err(_) => {
                debug!(kind, "No subscribers, event dropped");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
