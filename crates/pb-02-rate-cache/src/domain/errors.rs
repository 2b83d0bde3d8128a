use shared_types::TransportError;
use thiserror::Error;

/// Why one source failed during a refresh cycle. Never surfaced to the
/// consumer; logged and followed by the next tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateFetchError {
    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(#[from] TransportError),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("unparseable body: {0}")]
    Parse(String),
}

impl RateFetchError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network",
            Self::Status(_) => "status",
            Self::Parse(_) => "parse",
        }
    }
}
