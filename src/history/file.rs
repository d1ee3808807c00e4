use async_trait::async_trait;
use log::warn;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::{ KeyValueStore, StorageError };

/// All keys live in one JSON object on disk.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        // An unreadable file is overwritten so the next write repairs it.
        let mut entries = match self.read_all().await {
            Err(StorageError::Json(e)) => {
                warn!("Storage file {} is corrupt, starting over: {}", self.path.display(), e);
                BTreeMap::new()
            }
            other => other?,
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("name").await.unwrap(), None);
        store.set("name", "Ada").await.unwrap();
        store.set("other", "[]").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("name").await.unwrap().as_deref(), Some("Ada"));
        assert_eq!(reopened.get("other").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("name").await, Err(StorageError::Json(_))));

        store.set("name", "Ada").await.unwrap();
        assert_eq!(store.get("name").await.unwrap().as_deref(), Some("Ada"));
    }
}
