//! # Gateway Metrics
//!
//! Enable with the `metrics` feature. Without it every recorder is a no-op.
//!
//! - `pb_gateway_requests_total{kind,outcome}` - credentialed lookups by outcome
//! - `pb_gateway_auth_invalid_total` - credential rejections broadcast
//! - `pb_gateway_price_lookups_total{source,outcome}` - price source results
//! - `pb_gateway_correlation_collisions_total` - ids reused while in flight

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref REQUESTS: IntCounterVec = register_int_counter_vec!(
        "pb_gateway_requests_total",
        "Credentialed API lookups by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("Failed to create REQUESTS metric");

    pub static ref AUTH_INVALID: IntCounter = register_int_counter!(
        "pb_gateway_auth_invalid_total",
        "Credential rejections broadcast to the consumer"
    )
    .expect("Failed to create AUTH_INVALID metric");

    pub static ref PRICE_LOOKUPS: IntCounterVec = register_int_counter_vec!(
        "pb_gateway_price_lookups_total",
        "Price source lookups by source and outcome",
        &["source", "outcome"]
    )
    .expect("Failed to create PRICE_LOOKUPS metric");

    pub static ref COLLISIONS: IntCounter = register_int_counter!(
        "pb_gateway_correlation_collisions_total",
        "Correlation ids reused while still in flight"
    )
    .expect("Failed to create COLLISIONS metric");
}

#[cfg(feature = "metrics")]
pub fn record_request(kind: &str, outcome: &str) {
    REQUESTS.with_label_values(&[kind, outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_auth_invalid() {
    AUTH_INVALID.inc();
}

#[cfg(feature = "metrics")]
pub fn record_price_lookup(source: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    PRICE_LOOKUPS.with_label_values(&[source, outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_collision() {
    COLLISIONS.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_request(_kind: &str, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_auth_invalid() {}

#[cfg(not(feature = "metrics"))]
pub fn record_price_lookup(_source: &str, _success: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_collision() {}
