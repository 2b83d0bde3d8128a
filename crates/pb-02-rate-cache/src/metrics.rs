//! # Rate Cache Metrics
//!
//! Enable with the `metrics` feature. Without it every recorder is a no-op.
//!
//! - `pb_rates_refreshes_total{outcome}` - refresh cycles by outcome
//! - `pb_rates_fetch_failures_total{tier,reason}` - failed source fetches

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref REFRESHES: IntCounterVec = register_int_counter_vec!(
        "pb_rates_refreshes_total",
        "Exchange-rate refresh cycles by outcome",
        &["outcome"]
    )
    .expect("Failed to create REFRESHES metric");

    pub static ref FETCH_FAILURES: IntCounterVec = register_int_counter_vec!(
        "pb_rates_fetch_failures_total",
        "Failed exchange-rate source fetches",
        &["tier", "reason"]
    )
    .expect("Failed to create FETCH_FAILURES metric");
}

#[cfg(feature = "metrics")]
pub fn record_refresh(outcome: &str) {
    REFRESHES.with_label_values(&[outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_fetch_failure(tier: &str, reason: &str) {
    FETCH_FAILURES.with_label_values(&[tier, reason]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_refresh(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_fetch_failure(_tier: &str, _reason: &str) {}
