use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use std::time::Duration;

use super::{ChatClient, UpstreamReply};
use crate::llm::{LlmConfig, DEFAULT_COMPLETIONS_URL};
use crate::llm::error::LlmError;
use crate::models::completion::CompletionRequest;

pub struct OpenAIChatClient {
    http: HttpClient,
    url: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_url = url.unwrap_or_else(|| DEFAULT_COMPLETIONS_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| LlmError::InvalidApiKey(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, url: api_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Self::new(api_key, config.base_url.clone(), config.timeout)
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<UpstreamReply, LlmError> {
        debug!(
            "POST {} model={} messages={} max_completion_tokens={}",
            self.url,
            request.model,
            request.messages.len(),
            request.max_completion_tokens
        );

        let resp = self.http.post(&self.url).json(request).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();

        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatMessage;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage::system("be brief").to_value(), ChatMessage::user("hello").to_value()],
            max_completion_tokens: 300,
        }
    }

    #[tokio::test]
    async fn sends_bearer_and_wire_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ],
                "max_completion_tokens": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"choices":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAIChatClient::new(
            "sk-test".into(),
            Some(format!("{}/v1/chat/completions", server.uri())),
            Duration::from_secs(5),
        ).unwrap();

        let reply = client.complete(&request()).await.unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, br#"{"choices":[]}"#.to_vec());
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"error":"slow down"}"#))
            .mount(&server)
            .await;

        let client = OpenAIChatClient::new("sk-test".into(), Some(server.uri()), Duration::from_secs(5))
            .unwrap();

        let reply = client.complete(&request()).await.unwrap();
        assert_eq!(reply.status, 429);
        assert!(!reply.is_success());
        assert_eq!(reply.json().unwrap(), json!({"error": "slow down"}));
    }

    #[test]
    fn missing_key_is_rejected() {
        let config = LlmConfig { api_key: Some("  ".into()), ..LlmConfig::default() };
        assert!(matches!(OpenAIChatClient::from_config(&config), Err(LlmError::MissingApiKey)));
    }
}
