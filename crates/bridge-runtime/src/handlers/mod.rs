//! # Event Handlers
//!
//! Runtime-owned subscribers that have no component crate of their own.

pub mod init_sync;
pub mod user_data;

pub use init_sync::InitSyncHandler;
pub use user_data::UserDataHandler;
