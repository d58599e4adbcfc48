use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body accepted by `POST /api/claude`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ClaudeRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Successful proxy reply: the first text block and the upstream usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeReply {
    pub response: String,
    pub usage: Value,
}

/// Failure body returned by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_and_skips_unset_fields() {
        let req = ClaudeRequest::prompt("hi").max_tokens(50);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"prompt": "hi", "maxTokens": 50}));
    }

    #[test]
    fn request_tolerates_missing_fields() {
        let req: ClaudeRequest = serde_json::from_value(json!({"system": "s"})).unwrap();
        assert_eq!(req.prompt, None);
        assert_eq!(req.system.as_deref(), Some("s"));
    }
}
