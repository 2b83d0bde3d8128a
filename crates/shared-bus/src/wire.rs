//! # Wire Format
//!
//! One event per line: `{"kind": "...", "payload": ...}`.

use crate::events::{BridgeEvent, Direction, EventKind};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("line is not a JSON object with a string `kind`")]
    MissingKind,

    #[error("unknown event kind `{0}`")]
    UnknownKind(String),

    #[error("event kind `{}` not accepted from this side", .0.wire_name())]
    WrongDirection(EventKind),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl WireError {
    /// Unknown and wrong-direction kinds are dropped silently by callers.
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::UnknownKind(_) | Self::WrongDirection(_))
    }
}

/// Decode a single line into an event.
pub fn decode(line: &str) -> Result<BridgeEvent, WireError> {
    let value: Value = serde_json::from_str(line)?;
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(WireError::MissingKind)?;
    if EventKind::from_wire_name(kind).is_none() {
        return Err(WireError::UnknownKind(kind.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode a line coming from the consumer. Outbound kinds are rejected.
pub fn decode_inbound(line: &str) -> Result<BridgeEvent, WireError> {
    let event = decode(line)?;
    match event.kind().direction() {
        Direction::Inbound => Ok(event),
        Direction::Outbound => Err(WireError::WrongDirection(event.kind())),
    }
}

/// Encode an event as a single line, without the trailing newline.
pub fn encode(event: &BridgeEvent) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}
