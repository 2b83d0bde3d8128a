//! # API Gateway
//!
//! Correlation-id multiplexed forwarder for the consumer's remote lookups.
//!
//! ## Flow
//!
//! ```text
//! apiFetch ──> GatewayBusAdapter ──> ApiGatewayService::handle_fetch
//!                                       │ no key: NO_API_KEY, no call
//!                                       └ spawn: GET ─> classify ─> apiResponse
//!                                                        └ 401/403: authInvalid
//! priceLookup ──> handle_price_lookup ─┬ steampy   ─> priceResponse
//!                                      └ steamcici ─> priceResponse
//! ```
//!
//! ## Error classification
//!
//! | Condition | Code |
//! |-----------|------|
//! | no stored key | `NO_API_KEY` |
//! | 401, 403, or 200 containing `Unauthorized` | `AUTH_INVALID` |
//! | any other non-200 | `HTTP_ERROR_<status>` |
//! | 200 with non-JSON body | `PARSE_ERROR` |
//! | transport failure | `NETWORK_ERROR` |
//!
//! There is no timeout on this path; a stalled remote leaves the request
//! outstanding and the caller decides what to do.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod service;

pub use adapters::GatewayBusAdapter;
pub use domain::{classify, GatewayConfig, InFlightRegistry};
pub use service::ApiGatewayService;
