use serde::{ Serialize, Deserialize };
use serde_json::{ json, Value };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }

    pub fn to_value(&self) -> Value {
        json!({ "role": self.role, "content": self.content })
    }
}

/// Body accepted by the proxy. `text` is the legacy single-message form.
/// Messages stay raw JSON so they are forwarded exactly as received.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ChatRequest {
    /// Content of the most recent user turn, falling back to `text`.
    /// Empty content on that turn also falls back.
    pub fn classification_subject(&self) -> String {
        self.messages
            .as_ref()
            .and_then(|messages| {
                messages.iter().rev().find(|m| m.get("role").and_then(Value::as_str) == Some("user"))
            })
            .and_then(|m| m.get("content").and_then(Value::as_str))
            .filter(|content| !content.is_empty())
            .map(str::to_string)
            .or_else(|| self.text.clone())
            .unwrap_or_default()
    }

    /// Messages to forward upstream. A bare `text` body becomes a single user turn.
    pub fn forwarded_messages(&self) -> Vec<Value> {
        match (&self.messages, &self.text) {
            (Some(messages), _) => messages.clone(),
            (None, Some(text)) => vec![ChatMessage::user(text.clone()).to_value()],
            (None, None) => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub in_scope: bool,
    pub reason: String,
}

impl ClassificationResult {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self { in_scope: true, reason: reason.into() }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self { in_scope: false, reason: reason.into() }
    }
}
