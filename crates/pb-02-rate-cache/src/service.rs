//! # Rate Cache Manager
//!
//! Keeps the stored exchange-rate snapshot no older than the TTL.
//!
//! ```text
//! tick -> FRESH? -> done
//!      -> STALE  -> primary --ok--> store, FRESH
//!                      \--fail--> secondary --ok--> store, FRESH
//!                                     \--fail--> unchanged, STALE
//! ```

use crate::domain::{CacheState, RateCacheConfig, RateFetchError, RateTier, RefreshOutcome};
use crate::metrics;
use pb_01_persistent_store::{BridgeRepository, StoreError};
use serde_json::Value;
use shared_types::{ExchangeRateSnapshot, HttpClient, RateTable, TimeSource};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub struct RateCacheManager {
    repo: BridgeRepository,
    http: Arc<dyn HttpClient>,
    clock: Arc<dyn TimeSource>,
    config: RateCacheConfig,
    /// Serializes refresh cycles so overlapping calls run one fetch chain.
    cycle: Mutex<()>,
}

impl RateCacheManager {
    pub fn new(
        repo: BridgeRepository,
        http: Arc<dyn HttpClient>,
        clock: Arc<dyn TimeSource>,
        config: RateCacheConfig,
    ) -> Self {
        Self {
            repo,
            http,
            clock,
            config,
            cycle: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    /// Freshness of the stored snapshot right now.
    pub fn state(&self) -> CacheState {
        self.state_at(self.clock.now_ms())
    }

    fn state_at(&self, now: u64) -> CacheState {
        match self.repo.exchange_rates() {
            Some(snapshot) if snapshot.is_fresh(now, self.config.ttl()) => CacheState::Fresh,
            _ => CacheState::Stale,
        }
    }

    /// Run one refresh cycle.
    ///
    /// Source failures are logged and end in `Exhausted`; only a failure
    /// to persist a fetched snapshot is an error.
    pub async fn refresh(&self) -> Result<RefreshOutcome, StoreError> {
        let _cycle = self.cycle.lock().await;

        // The snapshot is stamped with the cycle start so that a timer
        // period equal to the TTL always finds it stale on the next tick.
        let started = self.clock.now_ms();
        if self.state_at(started) == CacheState::Fresh {
            debug!("Exchange rates fresh, skipping refresh");
            metrics::record_refresh(RefreshOutcome::Fresh.as_str());
            return Ok(RefreshOutcome::Fresh);
        }

        for tier in RateTier::ORDER {
            match self.fetch_from(tier).await {
                Ok(rates) => {
                    let snapshot = ExchangeRateSnapshot::new(rates, started);
                    if !self.repo.replace_exchange_rates(&snapshot)? {
                        warn!(%tier, fetched_at = started, "Fetched snapshot not newer than stored one");
                    }
                    info!(%tier, currencies = snapshot.rates.len(), "Exchange rates refreshed");
                    let outcome = RefreshOutcome::Refreshed(tier);
                    metrics::record_refresh(outcome.as_str());
                    return Ok(outcome);
                }
                Err(e) => {
                    warn!(%tier, error = %e, "Exchange rate fetch failed");
                    metrics::record_fetch_failure(tier.as_str(), e.reason());
                }
            }
        }

        warn!("All exchange rate sources failed, keeping previous snapshot");
        metrics::record_refresh(RefreshOutcome::Exhausted.as_str());
        Ok(RefreshOutcome::Exhausted)
    }

    async fn fetch_from(&self, tier: RateTier) -> Result<RateTable, RateFetchError> {
        let url = match tier {
            RateTier::Primary => &self.config.primary_url,
            RateTier::Secondary => &self.config.secondary_url,
        };
        debug!(%tier, url = %url, "Fetching exchange rates");

        let response = tokio::time::timeout(self.config.fetch_timeout(), self.http.get(url))
            .await
            .map_err(|_| RateFetchError::Timeout(self.config.fetch_timeout_ms))??;

        if !response.is_ok() {
            return Err(RateFetchError::Status(response.status));
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(rates)) => Ok(rates),
            Ok(_) => Err(RateFetchError::Parse("body is not a JSON object".into())),
            Err(e) => Err(RateFetchError::Parse(e.to_string())),
        }
    }

    /// Refresh once immediately, then every TTL, until `shutdown` flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.ttl());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(ttl_ms = self.config.ttl_ms, "Rate cache refresher started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        error!(error = %e, "Failed to persist exchange rates");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Rate cache refresher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_01_persistent_store::InMemoryStore;
    use serde_json::json;
    use shared_types::testing::{ManualClock, Reply, ScriptedHttpClient};

    fn manager(http: ScriptedHttpClient) -> (RateCacheManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(10_000_000));
        let repo = BridgeRepository::new(Arc::new(InMemoryStore::new()));
        let manager = RateCacheManager::new(repo, Arc::new(http), clock.clone(), RateCacheConfig::default());
        (manager, clock)
    }

    #[tokio::test]
    async fn test_empty_cache_is_stale() {
        let (manager, _) = manager(ScriptedHttpClient::new());
        assert_eq!(manager.state(), CacheState::Stale);
    }

    #[tokio::test]
    async fn test_snapshot_stamped_with_cycle_start() {
        let http = ScriptedHttpClient::new().route("rates/v1", Reply::ok(r#"{"USD":0.14}"#));
        let (manager, clock) = manager(http);

        assert_eq!(manager.refresh().await.unwrap(), RefreshOutcome::Refreshed(RateTier::Primary));
        assert_eq!(manager.repo.exchange_rates().unwrap().fetched_at, 10_000_000);
        assert_eq!(manager.state(), CacheState::Fresh);

        clock.advance(manager.config().ttl());
        assert_eq!(manager.state(), CacheState::Stale);
    }

    #[tokio::test]
    async fn test_non_object_json_is_parse_failure() {
        let http = ScriptedHttpClient::new()
            .route("rates/v1", Reply::ok("[1, 2]"))
            .route("latest/CNY", Reply::ok(r#"{"rates":{"USD":0.14}}"#));
        let (manager, _) = manager(http);

        let outcome = manager.refresh().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Refreshed(RateTier::Secondary));
        assert_eq!(
            Value::Object(manager.repo.exchange_rates().unwrap().rates),
            json!({"rates": {"USD": 0.14}})
        );
    }
}
