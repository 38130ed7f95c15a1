//! Durable storage for the current mode

use std::path::PathBuf;

use async_trait::async_trait;
use modegov_types::Mode;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

/// Config store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value store for the persisted mode.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the persisted mode, if any.
    async fn load(&self) -> Result<Option<Mode>, StoreError>;

    /// Persist the mode.
    async fn save(&self, mode: Mode) -> Result<(), StoreError>;
}

/// In-memory config store.
pub struct MemoryConfigStore {
    mode: RwLock<Option<Mode>>,
    fail_saves: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self {
            mode: RwLock::new(None),
            fail_saves: false,
        }
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode: RwLock::new(Some(mode)),
            fail_saves: false,
        }
    }

    /// A store whose saves fail, for rollback tests.
    pub fn failing() -> Self {
        Self {
            mode: RwLock::new(None),
            fail_saves: true,
        }
    }

    /// The currently persisted mode, bypassing the trait.
    pub fn persisted(&self) -> Option<Mode> {
        *self.mode.read()
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<Option<Mode>, StoreError> {
        Ok(*self.mode.read())
    }

    async fn save(&self, mode: Mode) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("simulated save failure".into()));
        }
        *self.mode.write() = Some(mode);
        Ok(())
    }
}

/// File-backed config store holding the mode as a small JSON document.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> Result<Option<Mode>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mode: Mode = serde_json::from_str(&content)?;
        Ok(Some(mode))
    }

    async fn save(&self, mode: Mode) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(&mode)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), mode = %mode, "persisted mode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(Mode::Sovereign).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Mode::Sovereign));
    }

    #[tokio::test]
    async fn failing_store_rejects_saves() {
        let store = MemoryConfigStore::failing();
        assert!(store.save(Mode::Offline).await.is_err());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_round_trips() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("mode.json");

        let store = FileConfigStore::new(path.clone());
        assert_eq!(store.load().await.unwrap(), None);

        store.save(Mode::Offline).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Mode::Offline));

        // A fresh store instance sees the persisted mode
        let reopened = FileConfigStore::new(path);
        assert_eq!(reopened.load().await.unwrap(), Some(Mode::Offline));
    }
}
