mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use log::{ info, warn };
use std::sync::Arc;
use thiserror::Error;

use crate::client::conversation::Conversation;

pub const CONVERSATION_KEY: &str = "advisor_conversation_v1";
pub const NAME_KEY: &str = "advisor_user_name";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Unsupported storage type: {0}")]
    UnsupportedType(String),
}

/// String key/value persistence on the client side.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub fn create_store(
    storage_type: &str,
    path: &str
) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match storage_type.to_lowercase().as_str() {
        "file" => {
            info!("Chat history will be stored in file: {}", path);
            Ok(Arc::new(FileStore::new(path)))
        }
        "memory" => {
            info!("Chat history will be kept in memory only");
            Ok(Arc::new(MemoryStore::default()))
        }
        other => Err(StorageError::UnsupportedType(other.to_string())),
    }
}

/// Conversation and user-name persistence. Failures are logged and
/// swallowed so the chat keeps working from memory.
#[derive(Clone)]
pub struct ConversationStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub async fn load_conversation(&self) -> Option<Conversation> {
        let raw = match self.backend.get(CONVERSATION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not load conversation: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<Conversation>(&raw) {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                warn!("Could not load conversation: {}", e);
                None
            }
        }
    }

    pub async fn save_conversation(&self, conversation: &Conversation) {
        if let Err(e) = self.write_conversation(conversation).await {
            warn!("Could not save conversation: {}", e);
        }
    }

    async fn write_conversation(&self, conversation: &Conversation) -> Result<(), StorageError> {
        let json = serde_json::to_string(&conversation.trimmed_for_storage())?;
        self.backend.set(CONVERSATION_KEY, &json).await
    }

    pub async fn load_name(&self) -> Option<String> {
        match self.backend.get(NAME_KEY).await {
            Ok(name) => name.filter(|n| !n.is_empty()),
            Err(e) => {
                warn!("Could not load user name: {}", e);
                None
            }
        }
    }

    pub async fn save_name(&self, name: &str) {
        if let Err(e) = self.backend.set(NAME_KEY, name).await {
            warn!("Could not save user name: {}", e);
        }
    }
}
