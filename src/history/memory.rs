use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ KeyValueStore, StorageError };

/// In-process store. An optional quota caps the total bytes of keys and values.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn with_quota(quota: usize) -> Self {
        Self { entries: Mutex::default(), quota: Some(quota) }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overwrite_does_not_count_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "123456789").await.unwrap();
        store.set("k", "987654321").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("987654321"));

        let err = store.set("j", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 12, quota: 10 }));
    }
}
