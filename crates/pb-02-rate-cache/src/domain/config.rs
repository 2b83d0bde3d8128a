//! Rate cache configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TTL_MS: u64 = 3_600_000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PRIMARY_URL: &str = "https://api.augmentedsteam.com/rates/v1";
pub const DEFAULT_SECONDARY_URL: &str = "https://open.er-api.com/v6/latest/CNY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateCacheConfig {
    /// Maximum snapshot age, also the refresh timer period.
    pub ttl_ms: u64,
    /// Bound on each source fetch.
    pub fetch_timeout_ms: u64,
    pub primary_url: String,
    pub secondary_url: String,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
        }
    }
}

impl RateCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateCacheConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(3600));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: RateCacheConfig = serde_json::from_str(r#"{"ttl_ms": 60000}"#).unwrap();
        assert_eq!(config.ttl_ms, 60_000);
        assert_eq!(config.primary_url, DEFAULT_PRIMARY_URL);
    }
}
