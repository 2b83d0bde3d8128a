//! Adapters connecting the bridge to the outside world.
//!
//! - `http`: reqwest implementation of the `HttpClient` port
//! - `stdio`: line-delimited JSON transport to the consumer

pub mod http;
pub mod stdio;

pub use http::ReqwestHttpClient;
pub use stdio::{pump_inbound, OutboundWriter};
