//! In-scope gate: a short completion call whose answer decides whether a
//! question is forwarded. Every failure resolves to "in scope".

use log::{ debug, warn };
use serde_json::Value;
use std::sync::Arc;

use crate::llm::chat::ChatClient;
use crate::llm::error::LlmError;
use crate::models::chat::{ ChatMessage, ClassificationResult };
use crate::models::completion::{ first_choice_content, CompletionRequest };

pub const ERROR_FALLBACK_REASON: &str = "classifier error fallback: allow";
pub const AMBIGUOUS_FALLBACK_REASON: &str = "classifier ambiguous fallback: allow";

const OUT_OF_SCOPE_MARKERS: [&str; 3] = ["false", "out_of_scope", "no"];

#[derive(Clone)]
pub struct ScopeClassifier {
    client: Arc<dyn ChatClient>,
    model: String,
    instruction: String,
    max_tokens: u32,
}

impl ScopeClassifier {
    pub fn new(
        client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        instruction: impl Into<String>,
        max_tokens: u32
    ) -> Self {
        Self {
            client,
            model: model.into(),
            instruction: instruction.into(),
            max_tokens,
        }
    }

    pub async fn classify(&self, subject: &str) -> ClassificationResult {
        match self.classifier_output(subject).await {
            Ok(raw) => {
                debug!("Classifier raw output: {}", raw);
                parse_verdict(&raw)
            }
            Err(e) => {
                warn!("Classifier unavailable, allowing request: {}", e);
                ClassificationResult::allow(ERROR_FALLBACK_REASON)
            }
        }
    }

    async fn classifier_output(&self, subject: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.instruction.clone()).to_value(),
                ChatMessage::user(subject).to_value()
            ],
            max_completion_tokens: self.max_tokens,
        };

        let reply = self.client.complete(&request).await?;
        if !reply.is_success() {
            return Err(LlmError::Status(reply.status));
        }
        let body = reply.json()?;
        Ok(first_choice_content(&body).unwrap_or_default().to_string())
    }
}

/// Reads the classifier's text. Valid non-null JSON decides by the truthiness
/// of `in_scope`; anything else goes through a lexical check that only denies
/// on an explicit negative marker.
pub fn parse_verdict(raw: &str) -> ClassificationResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) if !parsed.is_null() => {
            let in_scope = parsed.get("in_scope").map(is_truthy).unwrap_or(false);
            let reason = parsed
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            ClassificationResult { in_scope, reason }
        }
        _ => {
            let lowered = raw.to_lowercase();
            if OUT_OF_SCOPE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                ClassificationResult::deny(raw)
            } else {
                ClassificationResult::allow(AMBIGUOUS_FALLBACK_REASON)
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
