//! # Outbound Ports (Driven Ports)
//!
//! The storage interface every bridge component is handed.

use crate::domain::errors::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Durable key-value store surviving process restarts.
///
/// Synchronous and last-write-wins. There are no transactions and no
/// atomicity across keys; every `set` replaces the whole value.
pub trait PersistentStore: Send + Sync {
    /// Current value of `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Replace the value of `key`. On error nothing changes.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Vec<String>;
}

/// Typed helpers over any [`PersistentStore`].
pub trait StoreExt: PersistentStore {
    /// Typed `get(key, default)`.
    ///
    /// A stored value of the wrong shape yields `default`.
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            None | Some(Value::Null) => default,
            Some(value) => match serde_json::from_value(value) {
                Ok(typed) => typed,
                Err(e) => {
                    warn!(key, error = %e, "Stored value has unexpected shape, using default");
                    default
                }
            },
        }
    }

    fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set(key, serde_json::to_value(value)?)
    }
}

impl<S: PersistentStore + ?Sized> StoreExt for S {}
