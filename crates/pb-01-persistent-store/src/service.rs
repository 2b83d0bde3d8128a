//! # Bridge Repository
//!
//! Typed access to the persisted user state. All components share one
//! repository over one injected store.

use crate::domain::errors::StoreError;
use crate::ports::outbound::{PersistentStore, StoreExt};
use serde_json::Value;
use shared_types::{keys, EntryList, ExchangeRateSnapshot, RateTable, StoredConfig, TimestampMs};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct BridgeRepository {
    store: Arc<dyn PersistentStore>,
}

impl BridgeRepository {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    // =========================================================================
    // CREDENTIAL
    // =========================================================================

    /// The stored API key. An empty string counts as absent.
    pub fn api_key(&self) -> Option<String> {
        self.store
            .get_or::<Option<String>>(keys::API_KEY, None)
            .filter(|key| !key.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), StoreError> {
        self.store.set(keys::API_KEY, Value::String(key.to_string()))?;
        info!(present = !key.is_empty(), "API key updated");
        Ok(())
    }

    /// The only deletion path in the store.
    pub fn clear_api_key(&self) -> Result<(), StoreError> {
        self.store.delete(keys::API_KEY)?;
        info!("API key cleared");
        Ok(())
    }

    // =========================================================================
    // USER LISTS
    // =========================================================================

    pub fn favorites(&self) -> EntryList {
        self.store.get_or(keys::FAVORITES, EntryList::new())
    }

    pub fn set_favorites(&self, favorites: &EntryList) -> Result<(), StoreError> {
        self.store.set_as(keys::FAVORITES, favorites)?;
        debug!(count = favorites.len(), "Favorites stored");
        Ok(())
    }

    pub fn friend_codes(&self) -> EntryList {
        self.store.get_or(keys::FRIEND_CODES, EntryList::new())
    }

    pub fn set_friend_codes(&self, codes: &EntryList) -> Result<(), StoreError> {
        self.store.set_as(keys::FRIEND_CODES, codes)?;
        debug!(count = codes.len(), "Friend codes stored");
        Ok(())
    }

    pub fn wishlist(&self) -> Option<Value> {
        self.store.get(keys::WISHLIST).filter(|v| !v.is_null())
    }

    pub fn set_wishlist(&self, wishlist: Value) -> Result<(), StoreError> {
        self.store.set(keys::WISHLIST, wishlist)
    }

    // =========================================================================
    // EXCHANGE RATES
    // =========================================================================

    /// The cached snapshot, if a rate table has ever been stored.
    ///
    /// A table without a timestamp reads as fetched at epoch 0, i.e. stale.
    pub fn exchange_rates(&self) -> Option<ExchangeRateSnapshot> {
        let rates: Option<RateTable> = self.store.get_or(keys::EXCHANGE_RATES, None);
        let fetched_at: TimestampMs = self.store.get_or(keys::EXCHANGE_RATES_TS, 0);
        rates.map(|rates| ExchangeRateSnapshot::new(rates, fetched_at))
    }

    /// Store `snapshot` if it is strictly newer than the current one.
    ///
    /// Returns whether it was written. The table and its timestamp live
    /// under two keys and the store has no cross-key atomicity, so the table
    /// goes first and is put back if the timestamp write fails. A new table
    /// is never left behind under the previous timestamp by a failed call.
    pub fn replace_exchange_rates(&self, snapshot: &ExchangeRateSnapshot) -> Result<bool, StoreError> {
        let previous = self.exchange_rates();
        if let Some(current) = &previous {
            if snapshot.fetched_at <= current.fetched_at {
                debug!(
                    current = current.fetched_at,
                    candidate = snapshot.fetched_at,
                    "Ignoring snapshot that is not newer"
                );
                return Ok(false);
            }
        }

        self.store
            .set(keys::EXCHANGE_RATES, Value::Object(snapshot.rates.clone()))?;
        if let Err(e) = self
            .store
            .set(keys::EXCHANGE_RATES_TS, Value::from(snapshot.fetched_at))
        {
            let restored = match previous {
                Some(previous) => self
                    .store
                    .set(keys::EXCHANGE_RATES, Value::Object(previous.rates)),
                None => self.store.delete(keys::EXCHANGE_RATES),
            };
            if let Err(restore_error) = restored {
                warn!(error = %restore_error, "Cannot restore previous rate table");
            }
            return Err(e);
        }
        Ok(true)
    }

    // =========================================================================
    // AGGREGATE
    // =========================================================================

    pub fn stored_config(&self) -> StoredConfig {
        StoredConfig {
            api_key: self.api_key(),
            favorites: self.favorites(),
            friend_codes: self.friend_codes(),
            wishlist: self.wishlist(),
            exchange_rates: self.exchange_rates(),
        }
    }
}

impl std::fmt::Debug for BridgeRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeRepository")
            .field("keys", &self.store.keys())
            .finish()
    }
}
