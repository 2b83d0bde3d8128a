//! # Bridge Container
//!
//! Holds every component instance and hands out the shared pieces.
//!
//! ## Wiring
//!
//! ```text
//! StoreLock ─ FileBackedStore ─ BridgeRepository ─┬─ RateCacheManager ── HttpClient, TimeSource
//!                                                 ├─ ApiGatewayService ─ HttpClient, EventBus
//!                                                 └─ handlers (user data, init sync)
//! ```
//!
//! Components only share the repository and the bus. None of them calls
//! another directly.

pub mod config;

pub use config::{BridgeConfig, ConfigError};

use crate::adapters::ReqwestHttpClient;
use pb_01_persistent_store::{BridgeRepository, FileBackedStore, PersistentStore, StoreError, StoreLock};
use pb_02_rate_cache::RateCacheManager;
use pb_03_api_gateway::ApiGatewayService;
use shared_bus::{EventPublisher, InMemoryEventBus};
use shared_types::{HttpClient, SystemTimeSource, TimeSource};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Open the store under the configured data directory, holding its lock.
///
/// The lock must outlive every use of the repository.
pub fn open_repository(
    config: &BridgeConfig,
) -> Result<(BridgeRepository, StoreLock), StoreError> {
    let lock = StoreLock::acquire(&config.storage.data_dir)?;
    let store = FileBackedStore::open(config.storage.store_path())?;
    info!(path = %store.path().display(), "Store opened");
    Ok((BridgeRepository::new(Arc::new(store)), lock))
}

/// Every long-lived component, built once at startup.
pub struct BridgeContainer {
    pub config: BridgeConfig,
    pub event_bus: Arc<InMemoryEventBus>,
    pub repository: BridgeRepository,
    pub rate_cache: Arc<RateCacheManager>,
    pub api_gateway: Arc<ApiGatewayService>,
    _lock: Option<StoreLock>,
}

impl BridgeContainer {
    /// Production wiring: file store with lock, reqwest client, system clock.
    pub fn open(config: BridgeConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        let (repository, lock) = open_repository(&config)?;
        let http = Arc::new(ReqwestHttpClient::new(&config.http)?);

        let mut container = Self::with_parts(
            config,
            Arc::clone(repository.store()),
            http,
            Arc::new(SystemTimeSource),
        );
        container._lock = Some(lock);
        Ok(container)
    }

    /// Wire the components over the given ports.
    pub fn with_parts(
        config: BridgeConfig,
        store: Arc<dyn PersistentStore>,
        http: Arc<dyn HttpClient>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let event_bus = Arc::new(InMemoryEventBus::new());
        let repository = BridgeRepository::new(store);

        let rate_cache = Arc::new(RateCacheManager::new(
            repository.clone(),
            Arc::clone(&http),
            clock,
            config.rates.clone(),
        ));

        let publisher: Arc<dyn EventPublisher> = event_bus.clone();
        let api_gateway = Arc::new(ApiGatewayService::new(
            repository.clone(),
            publisher,
            http,
            config.gateway.clone(),
        ));

        Self {
            config,
            event_bus,
            repository,
            rate_cache,
            api_gateway,
            _lock: None,
        }
    }

    pub fn publisher(&self) -> Arc<dyn EventPublisher> {
        self.event_bus.clone()
    }
}
