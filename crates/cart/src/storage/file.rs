//! JSON file-backed key-value store.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use super::{KeyValueStore, StorageError};

/// Store persisting every key into a single JSON object file.
///
/// The whole map is rewritten on each `set`/`remove`. Intended for a single
/// process; concurrent writers from other processes are last-writer-wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    inner: Arc<RwLock<BTreeMap<String, String>>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is treated as an empty store
    /// and created on the first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read, or
    /// `StorageError::Corrupt` if it is not a JSON object of strings.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let file_path = path.into();

        let map = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::Corrupt(format!("{}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(map)),
            file_path,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(map)?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut map = self.inner.write().await;
        let previous = map.insert(key.to_string(), value);

        if let Err(e) = self.save(&map).await {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => map.insert(key.to_string(), old),
                None => map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut map = self.inner.write().await;
        let Some(previous) = map.remove(key) else {
            return Ok(false);
        };

        if let Err(e) = self.save(&map).await {
            map.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }
}
