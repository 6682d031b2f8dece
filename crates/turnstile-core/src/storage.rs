//! Client-side key-value persistence
//!
//! The session gate keeps a single record here. `MemoryStore` backs tests,
//! `FileStore` keeps every key in one JSON object on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::StorageError;

/// Narrow key-value store interface
pub trait KeyValueStore: Send {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove a key (no-op if absent)
    fn clear(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON object file store
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user data directory
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("turnstile")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => {
                tracing::warn!("Store file {:?} is not a JSON object, ignoring it", self.path);
                Ok(Map::new())
            }
        }
    }

    /// Current contents as the base for a write
    ///
    /// An unparseable file is replaced rather than blocking every write.
    fn read_for_write(&self) -> Result<Map<String, Value>, StorageError> {
        match self.read_all() {
            Err(StorageError::Json(e)) => {
                tracing::warn!("Store file {:?} is not valid JSON ({}), replacing it", self.path, e);
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn write_all(&self, map: Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, contents)?;

        // Session tokens stay readable by the owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut map = self.read_for_write()?;
        map.insert(key.to_string(), value);
        self.write_all(map)
    }

    fn clear(&mut self, key: &str) -> Result<(), StorageError> {
        match self.read_all() {
            Ok(mut map) => {
                if map.remove(key).is_some() {
                    self.write_all(map)?;
                }
                Ok(())
            }
            Err(StorageError::Json(e)) => {
                tracing::warn!("Store file {:?} is not valid JSON ({}), resetting it", self.path, e);
                self.write_all(Map::new())
            }
            Err(e) => Err(e),
        }
    }
}
