pub mod classify;
pub mod config;
pub mod inflight;

pub use classify::{classify, parse_price_body};
pub use config::GatewayConfig;
pub use inflight::{InFlightRegistry, InFlightStats};
