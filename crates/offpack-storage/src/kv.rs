//! String-keyed slots holding serialized documents

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

use crate::{Result, StorageError};

/// Durable key-value storage, one opaque string value per key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, `None` if it was never written
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot, missing slots are not an error
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// File-backed store: each key is a `<key>.json` file under the root directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store under the platform data directory
    pub fn open_default() -> Result<Self> {
        Self::new(default_data_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for_key(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for_key(key)?;
        let tmp = path.with_extension("json.tmp");

        // The snapshot is on disk before it replaces the old file, so a crash
        // leaves either the old or the new snapshot
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for_key(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, nothing survives the process
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.items().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.items().remove(key);
        Ok(())
    }
}

/// Platform data directory for offpack
pub fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("com", "offpack", "offpack")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data")).unwrap();

        assert_eq!(store.get_item("downloadState").await.unwrap(), None);

        store.set_item("downloadState", "{\"a\":1}").await.unwrap();
        store.set_item("downloadState", "{\"a\":2}").await.unwrap();
        assert_eq!(
            store.get_item("downloadState").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(store.root().join("downloadState.json").exists());
        assert!(!store.root().join("downloadState.json.tmp").exists());

        store.remove_item("downloadState").await.unwrap();
        store.remove_item("downloadState").await.unwrap();
        assert_eq!(store.get_item("downloadState").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_interrupted_write_keeps_last_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.set_item("downloadState", "{\"a\":1}").await.unwrap();

        // A write that died before the rename leaves only a partial temp file
        std::fs::write(dir.path().join("downloadState.json.tmp"), "{\"a\":").unwrap();
        assert_eq!(
            store.get_item("downloadState").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        store.set_item("downloadState", "{\"a\":2}").await.unwrap();
        assert_eq!(
            store.get_item("downloadState").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(!dir.path().join("downloadState.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let err = store.set_item("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));

        let memory = MemoryStore::new();
        assert!(memory.get_item("").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.set_item("k", "v").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v"));
        store.remove_item("k").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
    }
}
