//! # Shared Types Crate
//!
//! Data model, error taxonomy and outbound ports shared by the bridge
//! components.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: persisted shapes (`StoredConfig`,
//!   `ExchangeRateSnapshot`) and storage key names are defined here.
//! - **Ports, not clients**: components depend on the `HttpClient` and
//!   `TimeSource` traits; concrete adapters live in the runtime.
//! - **Closed taxonomy**: every gateway failure is one `ApiErrorCode`.

pub mod entities;
pub mod errors;
pub mod http;
pub mod keys;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use entities::*;
pub use errors::ApiErrorCode;
pub use http::{HttpClient, HttpResponse, TransportError};
pub use time::{SystemTimeSource, TimeSource};
