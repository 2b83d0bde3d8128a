//! Storage Adapters
//!
//! Implementations of the `PersistentStore` trait.

mod file;
mod memory;

pub use file::FileBackedStore;
pub use memory::InMemoryStore;
