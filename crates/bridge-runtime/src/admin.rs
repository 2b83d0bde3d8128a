//! Credential management and state inspection for the command line.

use pb_01_persistent_store::{BridgeRepository, StoreError};
use shared_types::SnapshotPayload;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("API key must not be empty")]
    EmptyKey,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store `raw` after trimming surrounding whitespace.
pub fn set_api_key(repo: &BridgeRepository, raw: &str) -> Result<(), AdminError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(AdminError::EmptyKey);
    }
    repo.set_api_key(key)?;
    Ok(())
}

pub fn clear_api_key(repo: &BridgeRepository) -> Result<(), AdminError> {
    repo.clear_api_key()?;
    Ok(())
}

/// Everything stored, with the credential replaced by its presence flag.
pub fn redacted_state(repo: &BridgeRepository) -> SnapshotPayload {
    let config = repo.stored_config();
    SnapshotPayload {
        has_api_key: config.has_api_key(),
        config: config.redacted(),
    }
}
