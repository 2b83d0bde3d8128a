//! # Error Types
//!
//! The gateway's error taxonomy. Codes travel to the consumer as plain
//! strings (`NO_API_KEY`, `HTTP_ERROR_502`, ...).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Outcome classification for a failed gateway exchange.
///
/// All codes are local to one request/response exchange; none is fatal
/// to the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ApiErrorCode {
    /// No credential stored; no network call was attempted.
    #[error("NO_API_KEY")]
    NoApiKey,

    /// Remote rejected the credential.
    #[error("AUTH_INVALID")]
    AuthInvalid,

    /// Remote answered with a non-success status.
    #[error("HTTP_ERROR_{0}")]
    HttpError(u16),

    /// Remote answered 200 with a body that is not valid JSON.
    #[error("PARSE_ERROR")]
    ParseError,

    /// Transport failure before any response arrived.
    #[error("NETWORK_ERROR")]
    NetworkError,
}

impl ApiErrorCode {
    /// Low-cardinality label; the status of `HttpError` is dropped.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoApiKey => "no_api_key",
            Self::AuthInvalid => "auth_invalid",
            Self::HttpError(_) => "http_error",
            Self::ParseError => "parse_error",
            Self::NetworkError => "network_error",
        }
    }
}

/// Error returned when a string is not a known code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ApiErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_API_KEY" => Ok(Self::NoApiKey),
            "AUTH_INVALID" => Ok(Self::AuthInvalid),
            "PARSE_ERROR" => Ok(Self::ParseError),
            "NETWORK_ERROR" => Ok(Self::NetworkError),
            other => other
                .strip_prefix("HTTP_ERROR_")
                .and_then(|status| status.parse().ok())
                .map(Self::HttpError)
                .ok_or_else(|| UnknownErrorCode(other.to_string())),
        }
    }
}

impl Serialize for ApiErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
