//! # Core Domain Entities
//!
//! Persisted user state and the exchange-rate snapshot.
//!
//! ## Clusters
//!
//! - **User data**: `StoredConfig`, `EntryList`
//! - **Rates**: `ExchangeRateSnapshot`, `RateTable`
//! - **Gateway**: `ApiKind`, `PriceSource`
//! - **Startup**: `SnapshotPayload`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Unix epoch milliseconds.
pub type TimestampMs = u64;

/// Ordered list of consumer-defined identifiers.
///
/// Entries are opaque JSON so whatever encoding the consumer uses
/// (numeric app ids, strings, small objects) round-trips unchanged.
pub type EntryList = Vec<Value>;

/// Currency code to rate, exactly as the provider returned it.
pub type RateTable = serde_json::Map<String, Value>;

// =============================================================================
// EXCHANGE RATES
// =============================================================================

/// Point-in-time copy of fetched exchange-rate data.
///
/// Replaced wholesale, never merged. `fetched_at` never moves backwards
/// across successive writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSnapshot {
    /// Rate table from the provider.
    pub rates: RateTable,
    /// When the refresh cycle that produced this snapshot started.
    pub fetched_at: TimestampMs,
}

impl ExchangeRateSnapshot {
    pub fn new(rates: RateTable, fetched_at: TimestampMs) -> Self {
        Self { rates, fetched_at }
    }

    /// Age relative to `now`. A snapshot from the future has age zero.
    #[must_use]
    pub fn age(&self, now: TimestampMs) -> Duration {
        Duration::from_millis(now.saturating_sub(self.fetched_at))
    }

    /// True while `now - fetched_at < ttl`.
    #[must_use]
    pub fn is_fresh(&self, now: TimestampMs, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

// =============================================================================
// USER DATA
// =============================================================================

/// Everything the consumer has persisted through the bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    /// Web API credential. Empty strings are normalized to `None`.
    pub api_key: Option<String>,
    pub favorites: EntryList,
    pub friend_codes: EntryList,
    /// Opaque wishlist snapshot owned by the consumer.
    pub wishlist: Option<Value>,
    pub exchange_rates: Option<ExchangeRateSnapshot>,
}

impl StoredConfig {
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Copy with the credential removed, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            api_key: None,
            ..self.clone()
        }
    }
}

/// Aggregate pushed to the consumer once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    /// Presence flag so the consumer can render state without the secret.
    pub has_api_key: bool,
    #[serde(flatten)]
    pub config: StoredConfig,
}

impl From<StoredConfig> for SnapshotPayload {
    fn from(config: StoredConfig) -> Self {
        Self {
            has_api_key: config.has_api_key(),
            config,
        }
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Closed set of remote lookups the gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiKind {
    /// Player summary lookup.
    Summary,
    /// Owned games lookup, including free games and app metadata.
    Owned,
}

impl ApiKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Owned => "owned",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External catalog/price services queried by a price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceSource {
    Steampy,
    Steamcici,
}

impl PriceSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Steampy => "steampy",
            Self::Steamcici => "steamcici",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_freshness_boundary() {
        let snapshot = ExchangeRateSnapshot::new(RateTable::new(), 1_000);
        let ttl = Duration::from_millis(3_600_000);

        assert!(snapshot.is_fresh(1_000 + 3_599_999, ttl));
        assert!(!snapshot.is_fresh(1_000 + 3_600_000, ttl));
    }

    #[test]
    fn test_snapshot_from_future_is_fresh() {
        let snapshot = ExchangeRateSnapshot::new(RateTable::new(), 5_000);
        assert_eq!(snapshot.age(1_000), Duration::ZERO);
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let config = StoredConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_snapshot_payload_wire_shape() {
        let config = StoredConfig {
            api_key: Some("K".into()),
            favorites: vec![json!(10), json!("20")],
            ..Default::default()
        };
        let value = serde_json::to_value(SnapshotPayload::from(config)).unwrap();

        assert_eq!(value["hasApiKey"], json!(true));
        assert_eq!(value["apiKey"], json!("K"));
        assert_eq!(value["favorites"], json!([10, "20"]));
        assert_eq!(value["friendCodes"], json!([]));
        assert!(value["wishlist"].is_null());
        assert!(value["exchangeRates"].is_null());
    }

    #[test]
    fn test_api_kind_wire_names() {
        assert_eq!(serde_json::to_value(ApiKind::Owned).unwrap(), json!("owned"));
        let parsed: ApiKind = serde_json::from_value(json!("summary")).unwrap();
        assert_eq!(parsed, ApiKind::Summary);
        assert!(serde_json::from_value::<ApiKind>(json!("friends")).is_err());
    }
}
