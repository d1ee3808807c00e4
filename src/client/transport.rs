use async_trait::async_trait;
use log::error;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::chat::ChatMessage;
use crate::models::completion::first_choice_content;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Direct OpenAI fallback is disabled. Configure WORKER_URL for production or enable the fallback for local testing.")]
    MissingWorkerUrl,

    #[error("Invalid WORKER_URL '{0}'")]
    InvalidWorkerUrl(String),

    #[error("Worker error: {status} {body}")]
    Worker { status: u16, body: String },

    #[error("Could not connect to API: {0}")]
    Connection(#[from] reqwest::Error),
}

/// Sends the whole conversation and returns the assistant's text.
#[async_trait]
pub trait AssistantTransport: Send + Sync {
    async fn ask(&self, messages: &[ChatMessage]) -> Result<String, ClientError>;
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    messages: &'a [ChatMessage],
}

pub struct ProxyTransport {
    http: reqwest::Client,
    worker_url: Option<String>,
}

impl ProxyTransport {
    pub fn new(worker_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            worker_url: worker_url.filter(|url| !url.trim().is_empty()),
        }
    }

    async fn post(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let url = self.worker_url.as_deref().ok_or(ClientError::MissingWorkerUrl)?;
        let url = reqwest::Url::parse(url).map_err(|_| ClientError::InvalidWorkerUrl(url.to_string()))?;

        let res = self.http.post(url).json(&ProxyRequest { messages }).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::Worker { status: status.as_u16(), body });
        }

        let data: Value = res.json().await?;
        Ok(assistant_text(&data))
    }
}

#[async_trait]
impl AssistantTransport for ProxyTransport {
    async fn ask(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        self.post(messages).await.map_err(|e| {
            error!("Proxy request failed: {}", e);
            e
        })
    }
}

/// The first choice's text, or the whole body when there is none.
pub fn assistant_text(data: &Value) -> String {
    match first_choice_content(data) {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => data.to_string(),
    }
}
