use crate::domain::errors::StoreError;
use crate::ports::outbound::PersistentStore;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed store persisting every key in one JSON document.
///
/// Each write serializes the whole document to a temp file, syncs it and
/// renames it over the previous one. The in-memory view is only swapped
/// after the rename succeeds, so a failed write changes nothing.
#[derive(Debug)]
pub struct FileBackedStore {
    data: RwLock<BTreeMap<String, Value>>,
    path: PathBuf,
}

impl FileBackedStore {
    /// Open the store at `path`, loading existing contents.
    ///
    /// A missing or empty file is an empty store. A file that is not a
    /// JSON object is reported as [`StoreError::Corrupt`] and left alone.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = Self::load_from_file(&path)?;

        if data.is_empty() {
            info!(path = %path.display(), "Store file empty or not found");
        } else {
            info!(path = %path.display(), keys = data.len(), "Loaded store file");
        }

        Ok(Self {
            data: RwLock::new(data),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, Value>, StoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
            Ok(other) => Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("expected a JSON object, found {}", json_type(&other)),
            }),
            Err(e) => Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    fn save_to_file(&self, data: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(data)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| StoreError::io(&temp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| StoreError::io(&temp_path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&temp_path, e))?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Store file written");
        Ok(())
    }

    /// Apply `change` to a copy, persist it, then publish it.
    fn mutate(&self, change: impl FnOnce(&mut BTreeMap<String, Value>)) -> Result<(), StoreError> {
        let mut data = self.data.write();
        let mut next = data.clone();
        change(&mut next);
        self.save_to_file(&next)?;
        *data = next;
        Ok(())
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl PersistentStore for FileBackedStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.mutate(|data| {
            data.insert(key.to_string(), value);
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        if !self.data.read().contains_key(key) {
            return Ok(());
        }
        self.mutate(|data| {
            data.remove(key);
        })
    }

    fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }
}
