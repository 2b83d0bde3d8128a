//! # Rate Cache
//!
//! TTL-gated exchange-rate refresher with two-tier source fallback.
//!
//! The manager reads and writes the snapshot through
//! [`BridgeRepository`](pb_01_persistent_store::BridgeRepository), fetches
//! through the [`HttpClient`](shared_types::HttpClient) port and reads
//! time from a [`TimeSource`](shared_types::TimeSource), so every path is
//! testable without a network or a real clock.
//!
//! Failures never reach the consumer. A cycle where both sources fail
//! leaves the last good snapshot in place until the next tick.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod metrics;
pub mod service;

pub use domain::{CacheState, RateCacheConfig, RateFetchError, RateTier, RefreshOutcome};
pub use service::RateCacheManager;
