//! # HTTP Client Port
//!
//! The only network capability the bridge components see. The runtime
//! supplies a reqwest-backed adapter; tests use `testing::ScriptedHttpClient`.

use async_trait::async_trait;
use thiserror::Error;

/// A completed HTTP exchange. Any status counts as completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Shorthand for a 200 response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Failure before any HTTP response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Outbound port for GET requests.
///
/// Implementations must not apply a total-request timeout of their own;
/// callers that need a bound race the future against a duration.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}
