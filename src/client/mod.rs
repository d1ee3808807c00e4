pub mod conversation;
pub mod name;
pub mod transport;
pub mod view;

use log::info;
use std::sync::Arc;

use crate::config::prompt::PromptConfig;
use crate::history::ConversationStore;
use crate::models::chat::{ ChatMessage, Role };
use self::conversation::Conversation;
use self::name::extract_name;
use self::transport::AssistantTransport;
use self::view::{ Bubble, BubbleKind, ChatView, LOADING_TEXT };

/// Owns the conversation and drives one view. Storage and transport are injected.
pub struct ChatController<V: ChatView> {
    conversation: Conversation,
    store: ConversationStore,
    view: V,
    transport: Arc<dyn AssistantTransport>,
}

impl<V: ChatView> ChatController<V> {
    /// Restores the stored conversation, or seeds a new one and greets.
    pub async fn load(
        store: ConversationStore,
        mut view: V,
        transport: Arc<dyn AssistantTransport>,
        prompts: &PromptConfig
    ) -> Self {
        let conversation = match store.load_conversation().await {
            Some(conversation) if !conversation.is_empty() => {
                render(&mut view, &conversation);
                conversation
            }
            _ => {
                let conversation = Conversation::seeded(prompts.system_directive());
                view.clear();
                view.append(Bubble::new(BubbleKind::Assistant, prompts.greeting()));
                store.save_conversation(&conversation).await;
                conversation
            }
        };

        Self { conversation, store, view, transport }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub async fn submit(&mut self, input: &str) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }

        self.remember_name(text).await;

        self.conversation.push(ChatMessage::user(text));
        self.view.append(Bubble::new(BubbleKind::User, text));
        self.store.save_conversation(&self.conversation).await;

        let loading = self.view.append(Bubble::new(BubbleKind::Loading, LOADING_TEXT));

        match self.transport.ask(self.conversation.messages()).await {
            Ok(reply) => {
                self.view.replace(loading, Bubble::new(BubbleKind::Assistant, reply.clone()));
                self.conversation.push(ChatMessage::assistant(reply));
                self.store.save_conversation(&self.conversation).await;
            }
            Err(e) => {
                self.view.replace(loading, Bubble::new(BubbleKind::Error, format!("Error: {}", e)));
            }
        }
    }

    async fn remember_name(&mut self, text: &str) {
        if self.store.load_name().await.is_some() {
            return;
        }
        if let Some(name) = extract_name(text) {
            info!("Detected user name: {}", name);
            self.store.save_name(&name).await;
            self.conversation.insert_profile(&name);
        }
    }
}

pub fn render<V: ChatView>(view: &mut V, conversation: &Conversation) {
    view.clear();
    for message in conversation.visible() {
        let kind = match message.role {
            Role::User => BubbleKind::User,
            _ => BubbleKind::Assistant,
        };
        view.append(Bubble::new(kind, message.content.clone()));
    }
}
