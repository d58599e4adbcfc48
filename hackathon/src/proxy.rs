//! `POST /api/claude`.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;
use std::sync::Arc;

use crate::anthropic::{MessageRequest, MessagesApi, Turn, UpstreamError};
use crate::presets::{DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM, models};
use crate::types::{ClaudeReply, ClaudeRequest, ErrorBody};

const UPSTREAM_FAILURE: &str = "Failed to get response from Claude";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::MissingPrompt => {
                let body = ErrorBody {
                    error: self.to_string(),
                    details: None,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            other => {
                let body = ErrorBody {
                    error: UPSTREAM_FAILURE.into(),
                    details: Some(other.to_string()),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Single-turn relay in front of a [`MessagesApi`].
///
/// Serves `POST /api/claude`. No retries and no streaming: one request in,
/// one upstream call, one reply out.
pub struct ClaudeProxy {
    api: Arc<dyn MessagesApi>,
}

impl ClaudeProxy {
    pub fn new(api: Arc<dyn MessagesApi>) -> Self {
        Self { api }
    }

    /// Build a router exposing the proxy endpoint.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().route(
            "/api/claude",
            post(move |body: Bytes| {
                let proxy = self.clone();
                async move { proxy.handle(body).await }
            }),
        )
    }

    async fn handle(&self, body: Bytes) -> Response {
        let result = match serde_json::from_slice::<ClaudeRequest>(&body) {
            Ok(req) => self.complete(req).await,
            Err(e) => Err(ProxyError::from(e)),
        };
        match result {
            Ok(reply) => Json(reply).into_response(),
            Err(ProxyError::MissingPrompt) => ProxyError::MissingPrompt.into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Claude API error");
                e.into_response()
            }
        }
    }

    /// Forward `req` upstream, applying the default model, system prompt and
    /// token limit where the caller left them unset.
    pub async fn complete(&self, req: ClaudeRequest) -> Result<ClaudeReply, ProxyError> {
        let prompt = req
            .prompt
            .filter(|p| !p.is_empty())
            .ok_or(ProxyError::MissingPrompt)?;
        let request = MessageRequest {
            model: req.model.unwrap_or_else(|| models::HAIKU.into()),
            max_tokens: req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: req
                .system
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM.into()),
            messages: vec![Turn::user(prompt)],
        };
        tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "relaying prompt");
        let message = self.api.create(&request).await?;
        let response = message
            .first_text()
            .ok_or(UpstreamError::EmptyContent)?
            .to_string();
        Ok(ClaudeReply {
            response,
            usage: message.usage,
        })
    }
}
