use axum::{
    body::{ Body, Bytes },
    extract::State,
    http::{ header, HeaderValue, StatusCode },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use log::debug;
use tower_http::set_header::SetResponseHeaderLayer;

use super::error::ProxyError;
use crate::agent::{ ProxyAgent, ProxyOutcome };
use crate::models::chat::ChatRequest;

#[derive(Clone)]
struct AppState {
    agent: ProxyAgent,
}

pub fn router(agent: ProxyAgent) -> Router {
    let app_state = AppState { agent };

    Router::new()
        .route("/", post(chat_handler).options(preflight_handler))
        .route("/{*path}", post(chat_handler).options(preflight_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(app_state)
}

async fn preflight_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let request: ChatRequest = serde_json::from_slice(&body)?;
    debug!(
        "Chat request with {} messages",
        request.messages.as_ref().map(|m| m.len()).unwrap_or(0)
    );

    match state.agent.respond(&request).await? {
        ProxyOutcome::Refused(completion) => Ok(Json(completion).into_response()),
        ProxyOutcome::Relayed(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok((
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                Body::from(reply.body),
            ).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tests::agent;
    use crate::classifier::tests::ScriptedClient;
    use crate::config::prompt::PromptConfig;
    use axum::http::{ Method, Request };
    use serde_json::{ json, Value };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn parse_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    async fn preflight_skips_upstream() {
        let client = Arc::new(ScriptedClient::default());
        let app = router(agent(client.clone()));

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("origin", "https://shop.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_cors(&resp);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
        assert!(client.recorded().is_empty());
    }

    #[tokio::test]
    async fn refusal_response_shape() {
        let client = Arc::new(ScriptedClient::default());
        client.push_classifier(r#"{"in_scope": false, "reason": "off-topic"}"#);
        let app = router(agent(client));

        let resp = app
            .oneshot(post_json(json!({"messages": [{"role": "user", "content": "who won the match?"}]})))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_cors(&resp);
        assert_eq!(resp.headers()["content-type"], "application/json");
        let body = parse_body(resp).await;
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["object"], "chat.completion");
        assert!(body["created"].as_i64().unwrap() > 0);
        assert_eq!(body["choices"][0]["index"], 0);
        assert_eq!(body["choices"][0]["message"]["role"], "assistant");
        assert_eq!(body["choices"][0]["message"]["content"], PromptConfig::default().refusal());
        assert_eq!(body["choices"][0]["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn upstream_body_and_status_are_relayed() {
        let client = Arc::new(ScriptedClient::default());
        client.push_classifier(r#"{"in_scope": true, "reason": "ok"}"#);
        client.push_reply(401, r#"{"error":{"message":"Incorrect API key"}}"#);
        let app = router(agent(client));

        let resp = app.oneshot(post_json(json!({"text": "lipstick shades?"}))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_cors(&resp);
        let body = parse_body(resp).await;
        assert_eq!(body, json!({"error": {"message": "Incorrect API key"}}));
    }

    #[tokio::test]
    async fn unknown_role_is_forwarded_not_rejected() {
        let client = Arc::new(ScriptedClient::default());
        client.push_classifier(r#"{"in_scope": true, "reason": "skincare"}"#);
        client.push_reply(200, r#"{"choices":[{"message":{"content":"Use a light serum."}}]}"#);
        let app = router(agent(client.clone()));

        let messages = json!([
            {"role": "developer", "content": "be terse"},
            {"role": "user", "content": "serum?", "name": "ann"}
        ]);
        let resp = app.oneshot(post_json(json!({"messages": messages.clone()}))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let sent = client.recorded();
        assert_eq!(sent.len(), 2);
        assert_eq!(Value::Array(sent[1].messages.clone()), messages);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let client = Arc::new(ScriptedClient::default());
        let app = router(agent(client.clone()));

        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_cors(&resp);
        assert!(parse_body(resp).await["error"]["message"].is_string());
        assert!(client.recorded().is_empty());
    }

    #[tokio::test]
    async fn forwarding_failure_is_bad_gateway() {
        let client = Arc::new(ScriptedClient::default());
        client.push_classifier(r#"{"in_scope": true, "reason": ""}"#);
        client.push_error(crate::llm::error::LlmError::MissingApiKey);
        let app = router(agent(client));

        let resp = app
            .oneshot(post_json(json!({"messages": [{"role": "user", "content": "foundation?"}]})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
