//! # Persistent Store
//!
//! Durable key-value storage for the bridge and the typed repository the
//! other components use.
//!
//! ## Layout
//!
//! - `ports::outbound::PersistentStore`: the injected storage port
//! - `adapters::storage`: `InMemoryStore`, `FileBackedStore`
//! - `adapters::lock`: exclusive data-directory lock (`locking` feature)
//! - `service::BridgeRepository`: typed accessors over the persisted keys
//!
//! Writes are last-write-wins full replacements of one key. There is no
//! atomicity across keys.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileBackedStore, InMemoryStore};
#[cfg(feature = "locking")]
pub use adapters::StoreLock;
pub use domain::errors::StoreError;
pub use ports::outbound::{PersistentStore, StoreExt};
pub use service::BridgeRepository;
