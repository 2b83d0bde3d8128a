use crate::domain::errors::StoreError;
use crate::ports::outbound::PersistentStore;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }
}
