pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use super::LlmConfig;
use super::error::LlmError;
use self::openai::OpenAIChatClient;
use crate::models::completion::CompletionRequest;

/// Raw upstream answer. The body is kept as bytes so it can be relayed untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, LlmError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<UpstreamReply, LlmError>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
