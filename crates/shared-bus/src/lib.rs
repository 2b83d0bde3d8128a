//! # Shared Bus
//!
//! Typed event bus connecting the privileged agent's components with the
//! unprivileged consumer.
//!
//! ## Architecture
//!
//! Components never call each other directly across the bridge. They
//! publish [`BridgeEvent`]s and subscribe with an [`EventFilter`]:
//!
//! ```text
//! consumer --line--> wire::decode_inbound --> bus --> gateway / handlers
//! gateway / handlers --> bus --> wire::encode --line--> consumer
//! ```
//!
//! Delivery is same-process and in publish order per subscriber. Nothing
//! is persisted and publishing never blocks.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;
pub mod wire;

pub use events::{
    ApiFetchRequest, ApiResponse, AuthInvalidNotice, BridgeEvent, DataUpdate, Direction,
    EventFilter, EventKind, FavoritesResponse, PriceLookupRequest, PriceResponse,
};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};
pub use wire::WireError;

/// Default channel capacity for the event bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
