//! Telemetry configuration from environment variables.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// `EnvFilter` directive (e.g. `info`, `pb_03_api_gateway=debug`)
    pub log_level: String,

    /// Emit one JSON object per log line instead of human-readable text
    pub json_logs: bool,

    /// Colour codes in text logs
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "price-bridge".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `PB_LOG_LEVEL` or `RUST_LOG`: filter directive (default: info)
    /// - `PB_JSON_LOGS`: `true`/`1` for JSON lines (default: false)
    /// - `PB_LOG_ANSI`: `true`/`1` for coloured text (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| {
            lookup(name)
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false)
        };

        Self {
            log_level: lookup("PB_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
            json_logs: flag("PB_JSON_LOGS"),
            ansi: flag("PB_LOG_ANSI"),
            ..Self::default()
        }
    }
}
