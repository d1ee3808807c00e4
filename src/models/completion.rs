use serde::{ Serialize, Deserialize };
use serde_json::Value;
use crate::models::chat::{ ChatMessage, Role };

/// Upstream chat-completion request body. Messages are kept as raw JSON so
/// caller-supplied roles and extra fields pass through untouched.
#[derive(Clone, Debug, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Value>,
    pub max_completion_tokens: u32,
}

/// Chat-completion shaped object the proxy produces itself (refusals).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: Option<String>,
    pub object: String,
    pub created: i64,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

impl ChatCompletion {
    pub fn refusal(content: impl Into<String>, created: i64) -> Self {
        Self {
            id: None,
            object: "chat.completion".to_string(),
            created,
            choices: vec![CompletionChoice {
                index: 0,
                message: ChatMessage { role: Role::Assistant, content: content.into() },
                finish_reason: "stop".to_string(),
            }],
        }
    }
}

/// `choices[0].message.content` of an arbitrary completion body, if it is a string.
pub fn first_choice_content(body: &Value) -> Option<&str> {
    body.get("choices")?.get(0)?.get("message")?.get("content")?.as_str()
}
