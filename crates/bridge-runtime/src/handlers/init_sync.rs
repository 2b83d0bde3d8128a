//! # Init Sync Handler
//!
//! Pushes the persisted state to the consumer once per process.
//!
//! ## Trigger
//!
//! ```text
//! ready ───────────────┐
//!                      ├──> initSnapshot (first one wins, then exit)
//! fallback delay ──────┘
//! ```
//!
//! With the fallback disabled only `ready` triggers the push. Shutdown
//! before either trigger sends nothing.

use bridge_telemetry::metrics;
use pb_01_persistent_store::BridgeRepository;
use shared_bus::{BridgeEvent, EventFilter, EventKind, EventPublisher, InMemoryEventBus, Subscription};
use shared_types::SnapshotPayload;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct InitSyncHandler {
    subscription: Subscription,
    repository: BridgeRepository,
    publisher: Arc<dyn EventPublisher>,
    fallback_delay: Option<Duration>,
}

impl InitSyncHandler {
    /// Subscribes immediately so a `ready` sent right after startup counts.
    pub fn new(
        bus: &InMemoryEventBus,
        publisher: Arc<dyn EventPublisher>,
        repository: BridgeRepository,
        fallback_delay: Option<Duration>,
    ) -> Self {
        Self {
            subscription: bus.subscribe(EventFilter::kinds(vec![EventKind::Ready])),
            repository,
            publisher,
            fallback_delay,
        }
    }

    /// Wait for a trigger and publish the snapshot.
    ///
    /// Returns `true` if the snapshot was published.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> bool {
        let delay = self.fallback_delay;
        let fallback = async move {
            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(fallback);

        let trigger = loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(BridgeEvent::Ready) => break "ready",
                    Some(other) => debug!(kind = other.kind().wire_name(), "Ignoring event"),
                    None => return false,
                },
                () = &mut fallback => break "fallback",
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return false;
                    }
                }
            }
        };

        self.publish_snapshot(trigger);
        true
    }

    fn publish_snapshot(&self, trigger: &'static str) {
        let payload = SnapshotPayload::from(self.repository.stored_config());
        info!(
            trigger,
            has_api_key = payload.has_api_key,
            favorites = payload.config.favorites.len(),
            has_rates = payload.config.exchange_rates.is_some(),
            "Sending initial snapshot"
        );
        self.publisher.publish(BridgeEvent::InitSnapshot(payload));
        metrics::record_snapshot_sent();
    }
}
