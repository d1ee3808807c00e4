use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key for upstream completion endpoint")]
    MissingApiKey,

    #[error("Invalid API key format: {0}")]
    InvalidApiKey(String),

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Upstream body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}
