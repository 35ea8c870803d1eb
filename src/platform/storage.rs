//! Key-value persistence
//!
//! Everything the game persists is a JSON string under a fixed key, so the
//! storage surface is just get/set/remove on strings.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage write failed: {0}")]
    Write(String),
}

/// String key-value store (LocalStorage semantics)
pub trait KeyValueStorage {
    /// Read a value; missing keys and read failures both yield `None`
    fn get(&self, key: &str) -> Option<String>;
    /// Overwrite the value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete `key` (deleting a missing key is not an error)
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile storage for tests and the native build
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key (builder style)
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        // Private browsing or disabled storage leaves this empty
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable - puzzles will not persist");
        }
        Self { inner }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner.as_ref().ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}
