use axum::{
    http::StatusCode,
    response::{ IntoResponse, Response },
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::llm::error::LlmError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Request body is not a valid chat request: {0}")]
    BadRequest(#[from] serde_json::Error),

    #[error("Completion request failed: {0}")]
    Upstream(#[from] LlmError),
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(json!({ "error": { "message": self.to_string() } }))).into_response()
    }
}
