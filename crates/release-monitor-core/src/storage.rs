//! Local key-value persistence
//!
//! State is kept as JSON blobs under string keys, the way a browser keeps
//! `localStorage`. [`FileStorage`] stores each key as `<dir>/<key>.json`;
//! [`MemoryStorage`] keeps everything in process.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Key of the tracked platform list
pub const PLATFORMS_KEY: &str = "platforms";
/// Key of the `[platform_id, game_id]` association list
pub const GAMES_KEY: &str = "games";

/// Raw string storage, last writer wins
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Directory-backed storage
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-process storage for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed list persistence on top of a [`KeyValueStorage`]
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStorage>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self { backend }
    }

    /// Convenience constructor for an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Read the list stored under `key`; an absent key is an empty list.
    ///
    /// Content that does not decode into `T` is reported as
    /// [`Error::Storage`] rather than silently dropped.
    pub fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.backend.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| Error::Storage {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite `key` with the JSON encoding of `items`
    pub fn save_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items).map_err(|source| Error::Storage {
            key: key.to_string(),
            source,
        })?;
        tracing::debug!(key, count = items.len(), "Persisting list");
        self.backend.set_item(key, &raw)
    }
}
