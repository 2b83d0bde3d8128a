//! User data handler.
//!
//! Applies `update` messages to the store and serves the legacy favorites
//! query/update pair. Store failures are logged and the message dropped;
//! the consumer gets no error reply on this path.

use bridge_telemetry::metrics;
use pb_01_persistent_store::{BridgeRepository, StoreError};
use shared_bus::{
    BridgeEvent, DataUpdate, EventFilter, EventKind, EventPublisher, FavoritesResponse,
    InMemoryEventBus, Subscription,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub struct UserDataHandler {
    subscription: Subscription,
    repository: BridgeRepository,
    publisher: Arc<dyn EventPublisher>,
}

impl UserDataHandler {
    pub fn new(
        bus: &InMemoryEventBus,
        publisher: Arc<dyn EventPublisher>,
        repository: BridgeRepository,
    ) -> Self {
        let filter = EventFilter::kinds(vec![
            EventKind::Update,
            EventKind::FavoritesQuery,
            EventKind::FavoritesUpdate,
        ]);
        Self {
            subscription: bus.subscribe(filter),
            repository,
            publisher,
        }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("User data handler started");

        loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(event) => {
                        let kind = event.kind();
                        if let Err(e) = self.handle(event) {
                            error!(kind = kind.wire_name(), error = %e, "Failed to persist user data");
                        }
                    }
                    None => {
                        warn!("Event bus closed, user data handler stopping");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("User data handler stopped");
    }

    /// Apply one event. Public so tests and admin tooling can drive it
    /// without a running loop.
    pub fn handle(&self, event: BridgeEvent) -> Result<(), StoreError> {
        match event {
            BridgeEvent::Update(update) => self.apply_update(update),
            BridgeEvent::FavoritesQuery => {
                let favorites = self.repository.favorites();
                debug!(count = favorites.len(), "Answering favorites query");
                self.publisher
                    .publish(BridgeEvent::FavoritesResponse(FavoritesResponse { favorites }));
                Ok(())
            }
            BridgeEvent::FavoritesUpdate(favorites) => {
                let favorites = favorites.unwrap_or_default();
                self.repository.set_favorites(&favorites)?;
                metrics::record_update("favorites");
                Ok(())
            }
            other => {
                debug!(kind = other.kind().wire_name(), "Ignoring event");
                Ok(())
            }
        }
    }

    fn apply_update(&self, update: DataUpdate) -> Result<(), StoreError> {
        let update_type = update.type_name();
        match update {
            DataUpdate::Favorites(list) => self.repository.set_favorites(&list)?,
            DataUpdate::FriendCodes(list) => self.repository.set_friend_codes(&list)?,
            DataUpdate::Wishlist(value) => self.repository.set_wishlist(value)?,
            DataUpdate::ApiKey(key) => self.repository.set_api_key(&key)?,
        }
        debug!(update_type, "User data updated");
        metrics::record_update(update_type);
        Ok(())
    }
}
