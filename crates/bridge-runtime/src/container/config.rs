//! # Bridge Configuration
//!
//! Unified configuration for every component and the runtime itself.
//!
//! ## Precedence
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. Environment (`PB_DATA_DIR`, `PB_INIT_FALLBACK_MS`)
//! 4. Command-line flags, applied by the binary
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes.

use pb_02_rate_cache::RateCacheConfig;
use pb_03_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default settle delay before the snapshot is pushed without a `ready`.
pub const DEFAULT_INIT_FALLBACK_MS: u64 = 1_000;

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub storage: StorageSettings,
    pub rates: RateCacheConfig,
    pub gateway: GatewayConfig,
    pub init: InitSettings,
    pub http: HttpSettings,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the store file and its lock.
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            file_name: "bridge-store.json".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

/// Startup snapshot behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    /// `None` or `0` waits for `ready` only.
    pub fallback_delay_ms: Option<u64>,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            fallback_delay_ms: Some(DEFAULT_INIT_FALLBACK_MS),
        }
    }
}

impl InitSettings {
    pub fn fallback_delay(&self) -> Option<Duration> {
        self.fallback_delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub connect_timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("price-bridge/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_ms: 5_000,
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl BridgeConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply environment overrides.
    ///
    /// - `PB_DATA_DIR`: storage directory
    /// - `PB_INIT_FALLBACK_MS`: settle delay; `0` or `off` disables it
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = lookup("PB_DATA_DIR").filter(|d| !d.is_empty()) {
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("PB_INIT_FALLBACK_MS") {
            let raw = raw.trim();
            self.init.fallback_delay_ms = if raw.eq_ignore_ascii_case("off") {
                None
            } else {
                match raw.parse::<u64>() {
                    Ok(0) => None,
                    Ok(ms) => Some(ms),
                    Err(_) => {
                        return Err(ConfigError::InvalidEnv {
                            name: "PB_INIT_FALLBACK_MS",
                            value: raw.to_string(),
                        })
                    }
                }
            };
        }

        Ok(())
    }

    /// Reject values that would make a component misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rates.ttl_ms == 0 {
            return Err(ConfigError::Zero("rates.ttl_ms"));
        }
        if self.rates.fetch_timeout_ms == 0 {
            return Err(ConfigError::Zero("rates.fetch_timeout_ms"));
        }
        if self.http.connect_timeout_ms == 0 {
            return Err(ConfigError::Zero("http.connect_timeout_ms"));
        }

        let required = [
            ("rates.primary_url", &self.rates.primary_url),
            ("rates.secondary_url", &self.rates.secondary_url),
            ("gateway.steam_api_base", &self.gateway.steam_api_base),
            ("gateway.steampy_url", &self.gateway.steampy_url),
            ("gateway.steamcici_url", &self.gateway.steamcici_url),
            ("storage.file_name", &self.storage.file_name),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }

        Ok(())
    }
}
