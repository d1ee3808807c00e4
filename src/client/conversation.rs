use serde::{ Serialize, Deserialize };

use crate::config::prompt::{ profile_message, PROFILE_MARKER };
use crate::models::chat::ChatMessage;

/// Non-system messages kept when the conversation is persisted.
pub const MAX_PERSISTED_TURNS: usize = 30;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn seeded(system_directive: impl Into<String>) -> Self {
        Self { messages: vec![ChatMessage::system(system_directive)] }
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn has_profile(&self) -> bool {
        let marker = PROFILE_MARKER.to_lowercase();
        self.messages
            .iter()
            .any(|m| m.is_system() && m.content.to_lowercase().contains(&marker))
    }

    /// Inserts the profile directly after the first message. Returns false
    /// when a profile is already present.
    pub fn insert_profile(&mut self, name: &str) -> bool {
        if self.has_profile() {
            return false;
        }
        let at = self.messages.len().min(1);
        self.messages.insert(at, ChatMessage::system(profile_message(name)));
        true
    }

    /// Messages a view should show, in order.
    pub fn visible(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_system())
    }

    /// System messages first, then the newest `MAX_PERSISTED_TURNS` others.
    pub fn trimmed_for_storage(&self) -> Conversation {
        let system = self.messages.iter().filter(|m| m.is_system());
        let chat: Vec<&ChatMessage> = self.visible().collect();
        let skip = chat.len().saturating_sub(MAX_PERSISTED_TURNS);

        Conversation {
            messages: system.chain(chat.into_iter().skip(skip)).cloned().collect(),
        }
    }
}
