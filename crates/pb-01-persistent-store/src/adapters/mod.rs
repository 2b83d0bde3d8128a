//! Storage and locking adapters.

#[cfg(feature = "locking")]
pub mod lock;
pub mod storage;

#[cfg(feature = "locking")]
pub use lock::StoreLock;
pub use storage::{FileBackedStore, InMemoryStore};
