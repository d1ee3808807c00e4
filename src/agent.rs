use chrono::Utc;
use log::{ info, warn };
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::ScopeClassifier;
use crate::cli::ServeArgs;
use crate::config::prompt::PromptConfig;
use crate::llm::chat::{ ChatClient, UpstreamReply, new_client as new_chat_client };
use crate::llm::error::LlmError;
use crate::llm::LlmConfig;
use crate::models::chat::ChatRequest;
use crate::models::completion::{ ChatCompletion, CompletionRequest };

/// What the proxy sends back for one request.
#[derive(Debug)]
pub enum ProxyOutcome {
    Refused(ChatCompletion),
    Relayed(UpstreamReply),
}

#[derive(Clone)]
pub struct ProxyAgent {
    chat_client: Arc<dyn ChatClient>,
    classifier: ScopeClassifier,
    completion_model: String,
    completion_max_tokens: u32,
    refusal: String,
}

impl ProxyAgent {
    pub fn new(args: &ServeArgs, prompts: &PromptConfig) -> Result<Self, LlmError> {
        let chat_config = LlmConfig {
            api_key: Some(args.api_key.clone()),
            base_url: Some(args.upstream_url.clone()),
            timeout: Duration::from_secs(args.upstream_timeout_secs),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Upstream configured: URL={}, CompletionModel={}, ClassifierModel={}",
            args.upstream_url,
            args.completion_model,
            args.classifier_model
        );

        Ok(Self::with_client(
            chat_client,
            prompts,
            args.completion_model.clone(),
            args.completion_max_tokens,
            args.classifier_model.clone(),
            args.classifier_max_tokens,
        ))
    }

    pub fn with_client(
        chat_client: Arc<dyn ChatClient>,
        prompts: &PromptConfig,
        completion_model: String,
        completion_max_tokens: u32,
        classifier_model: String,
        classifier_max_tokens: u32
    ) -> Self {
        let classifier = ScopeClassifier::new(
            chat_client.clone(),
            classifier_model,
            prompts.classifier_instruction(),
            classifier_max_tokens
        );
        Self {
            chat_client,
            classifier,
            completion_model,
            completion_max_tokens,
            refusal: prompts.refusal(),
        }
    }

    /// Classify, then either refuse or forward. Only a forwarding transport
    /// failure is an error; classifier failures already resolved to "allow".
    pub async fn respond(&self, request: &ChatRequest) -> Result<ProxyOutcome, LlmError> {
        let subject = request.classification_subject();
        let verdict = self.classifier.classify(&subject).await;
        info!("Classification: in_scope={} reason={:?}", verdict.in_scope, verdict.reason);

        if !verdict.in_scope {
            info!("Out-of-scope request refused");
            let refusal = ChatCompletion::refusal(self.refusal.clone(), Utc::now().timestamp_millis());
            return Ok(ProxyOutcome::Refused(refusal));
        }

        let completion = CompletionRequest {
            model: self.completion_model.clone(),
            messages: request.forwarded_messages(),
            max_completion_tokens: self.completion_max_tokens,
        };
        let reply = self.chat_client.complete(&completion).await?;
        if reply.is_success() {
            info!("Forwarded {} messages, upstream status {}", completion.messages.len(), reply.status);
        } else {
            warn!("Upstream completion returned status {}, relaying as-is", reply.status);
        }
        Ok(ProxyOutcome::Relayed(reply))
    }
}
