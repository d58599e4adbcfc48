use async_trait::async_trait;
use serde::Deserialize;

use crate::presets::{DEFAULT_MAX_TOKENS, models, system_prompts};
use crate::types::{ClaudeReply, ClaudeRequest, ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("API call failed: {0}")]
    Status(String),
    /// The proxy answered with an `error` body.
    #[error("{0}")]
    Remote(String),
}

/// Sends a prompt and waits for the whole reply.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn ask(&self, request: &ClaudeRequest) -> Result<ClaudeReply, ClientError>;
}

/// Overrides for [`ProxyClient::call_claude`].
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub system: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Failure(ErrorBody),
    Success(ClaudeReply),
}

/// HTTP client for a running proxy (`{base_url}/api/claude`).
#[derive(Clone, Debug)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/claude", self.base_url.trim_end_matches('/'))
    }

    /// Call the proxy with every field filled in, failing on any non-2xx
    /// status.
    ///
    /// Unset options fall back to the creative system prompt, the Haiku model
    /// and a 1000 token limit.
    pub async fn call_claude(
        &self,
        prompt: &str,
        options: CallOptions,
    ) -> Result<ClaudeReply, ClientError> {
        let request = ClaudeRequest::prompt(prompt)
            .system(
                options
                    .system
                    .unwrap_or_else(|| system_prompts::CREATIVE.into()),
            )
            .model(options.model.unwrap_or_else(|| models::HAIKU.into()))
            .max_tokens(options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));
        let resp = self.http.post(self.endpoint()).json(&request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = status.canonical_reason().unwrap_or("unknown status");
            return Err(ClientError::Status(text.into()));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Prompter for ProxyClient {
    /// Post `request` and inspect the body regardless of status; an `error`
    /// field turns into [`ClientError::Remote`].
    async fn ask(&self, request: &ClaudeRequest) -> Result<ClaudeReply, ClientError> {
        let resp = self.http.post(self.endpoint()).json(request).send().await?;
        match resp.json::<Envelope>().await? {
            Envelope::Success(reply) => Ok(reply),
            Envelope::Failure(body) => Err(ClientError::Remote(body.error)),
        }
    }
}
