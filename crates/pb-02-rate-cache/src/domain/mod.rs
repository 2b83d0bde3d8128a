pub mod config;
pub mod errors;
pub mod state;

pub use config::RateCacheConfig;
pub use errors::RateFetchError;
pub use state::{CacheState, RateTier, RefreshOutcome};
