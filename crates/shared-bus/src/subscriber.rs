//! # Subscriptions
//!
//! Receiving side of the bus. A [`Subscription`] only yields events its
//! filter accepts and keeps the bus's per-filter count in step.

use crate::events::{BridgeEvent, EventFilter};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

/// Live subscriptions keyed by filter description.
pub(crate) type FilterCounts = Arc<Mutex<HashMap<String, usize>>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every publisher handle is gone.
    #[error("Event bus closed")]
    Closed,
}

/// Filtered receiver. Dropping it unregisters it from the bus counts.
pub struct Subscription {
    receiver: broadcast::Receiver<BridgeEvent>,
    filter: EventFilter,
    counts: FilterCounts,
    key: String,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<BridgeEvent>,
        filter: EventFilter,
        counts: FilterCounts,
        key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            counts,
            key,
        }
    }

    /// Wait for the next accepted event. `None` once the bus is dropped.
    ///
    /// A receiver that fell behind loses the overwritten events and
    /// carries on from the oldest one still buffered.
    pub async fn recv(&mut self) -> Option<BridgeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber fell behind, events lost");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking [`Self::recv`]: `Ok(None)` when nothing accepted is queued.
    pub fn try_recv(&mut self) -> Result<Option<BridgeEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber fell behind, events lost");
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(&self.key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&self.key);
            }
        }
        debug!(kinds = %self.key, "Subscription dropped");
    }
}

#[cfg(test)]
mod tests {
    use crate::events::{BridgeEvent, EventFilter, EventKind, FavoritesResponse};
    use crate::publisher::{EventPublisher, InMemoryEventBus};
    use crate::SubscriptionError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_recv_filters_kinds() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::kinds(vec![EventKind::FavoritesResponse]));

        bus.publish(BridgeEvent::Ready);
        bus.publish(BridgeEvent::FavoritesResponse(FavoritesResponse {
            favorites: vec![serde_json::json!(1)],
        }));

        let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.kind(), EventKind::FavoritesResponse);
    }

    #[tokio::test]
    async fn test_same_kind_delivered_in_publish_order() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::kinds(vec![EventKind::FavoritesUpdate]));

        for n in 0..5 {
            bus.publish(BridgeEvent::FavoritesUpdate(Some(vec![serde_json::json!(n)])));
        }

        for n in 0..5 {
            let Some(BridgeEvent::FavoritesUpdate(Some(list))) = sub.recv().await else {
                panic!("expected favoritesUpdate");
            };
            assert_eq!(list, vec![serde_json::json!(n)]);
        }
    }

    #[test]
    fn test_try_recv_empty_then_closed() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        assert_eq!(sub.try_recv(), Ok(None));
        drop(bus);
        assert_eq!(sub.try_recv(), Err(SubscriptionError::Closed));
    }

    #[test]
    fn test_lagging_subscriber_skips_oldest() {
        let bus = InMemoryEventBus::with_capacity(2);
        let mut sub = bus.subscribe(EventFilter::all());

        for n in 0..4 {
            bus.publish(BridgeEvent::FavoritesUpdate(Some(vec![serde_json::json!(n)])));
        }

        let first = sub.try_recv().unwrap().unwrap();
        assert_eq!(
            first,
            BridgeEvent::FavoritesUpdate(Some(vec![serde_json::json!(2)]))
        );
    }
}
