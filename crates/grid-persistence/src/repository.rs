//! Loading and saving table status blobs.

use crate::error::{PersistenceError, Result};
use crate::status::TableStatus;
use crate::store::KeyValueStore;

/// Reads and writes [`TableStatus`] blobs through a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct StatusRepository<S> {
    store: S,
}

impl<S: KeyValueStore> StatusRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the blob for `key`.
    ///
    /// Returns `None` if:
    /// - No blob is stored under the key
    /// - The blob cannot be read
    /// - The blob is not a valid table status
    pub fn load(&self, key: &str) -> Option<TableStatus> {
        let text = match self.store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::info!("No stored layout for {key}, using defaults");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read stored layout for {key}: {e}, using defaults");
                return None;
            }
        };

        match TableStatus::from_json(&text) {
            Ok(status) => {
                tracing::info!("Loaded stored layout for {key}");
                Some(status)
            }
            Err(e) => {
                tracing::warn!("Failed to parse stored layout for {key}: {e}, using defaults");
                None
            }
        }
    }

    /// Load the blob for `key`, or build the page default.
    pub fn load_or_else(&self, key: &str, default: impl FnOnce() -> TableStatus) -> TableStatus {
        self.load(key).unwrap_or_else(default)
    }

    pub fn save(&mut self, key: &str, status: &TableStatus) -> Result<()> {
        let text = status
            .to_json()
            .map_err(|source| PersistenceError::Serialization { source })?;
        self.store.set(key, &text)?;
        tracing::info!("Saved layout for {key}");
        Ok(())
    }

    pub fn clear(&mut self, key: &str) -> Result<()> {
        self.store.remove(key)?;
        tracing::info!("Cleared stored layout for {key}");
        Ok(())
    }
}
