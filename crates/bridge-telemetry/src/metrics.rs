//! Prometheus metrics for the bridge boundary.
//!
//! Naming follows `pb_<area>_<metric>_<unit>`. Component crates register
//! their own counters in the default registry behind their `metrics`
//! feature; [`encode_metrics`] renders both registries together.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Registry for bridge-level metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Inbound events accepted from the consumer, by kind
    pub static ref EVENTS_RECEIVED: IntCounterVec = IntCounterVec::new(
        Opts::new("pb_bridge_events_received_total", "Events received from the consumer"),
        &["kind"]
    ).expect("metric creation failed");

    /// Outbound events written to the consumer, by kind
    pub static ref EVENTS_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new("pb_bridge_events_sent_total", "Events sent to the consumer"),
        &["kind"]
    ).expect("metric creation failed");

    /// Lines dropped at the wire boundary
    pub static ref LINES_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("pb_bridge_lines_rejected_total", "Inbound lines that were not accepted"),
        &["reason"]  // unknown_kind, wrong_direction, malformed
    ).expect("metric creation failed");

    /// Persisted user-data updates, by type
    pub static ref UPDATES_APPLIED: IntCounterVec = IntCounterVec::new(
        Opts::new("pb_bridge_updates_applied_total", "User data updates written to the store"),
        &["type"]
    ).expect("metric creation failed");

    /// Initial snapshots pushed (0 or 1 per process)
    pub static ref SNAPSHOTS_SENT: IntCounter = IntCounter::new(
        "pb_bridge_init_snapshots_total",
        "Initial state snapshots pushed to the consumer"
    ).expect("metric creation failed");
}

/// Register bridge metrics. Calling it twice is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_RECEIVED.clone()),
        Box::new(EVENTS_SENT.clone()),
        Box::new(LINES_REJECTED.clone()),
        Box::new(UPDATES_APPLIED.clone()),
        Box::new(SNAPSHOTS_SENT.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode bridge and component metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut metric_families = REGISTRY.gather();
    metric_families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

pub fn record_event_received(kind: &str) {
    EVENTS_RECEIVED.with_label_values(&[kind]).inc();
}

pub fn record_event_sent(kind: &str) {
    EVENTS_SENT.with_label_values(&[kind]).inc();
}

pub fn record_line_rejected(reason: &str) {
    LINES_REJECTED.with_label_values(&[reason]).inc();
}

pub fn record_update(update_type: &str) {
    UPDATES_APPLIED.with_label_values(&[update_type]).inc();
}

pub fn record_snapshot_sent() {
    SNAPSHOTS_SENT.inc();
}
