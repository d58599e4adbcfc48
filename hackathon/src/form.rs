use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::client::Prompter;
use crate::types::ClaudeRequest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Professional,
    Casual,
    Creative,
    Technical,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Professional => "professional",
            Style::Casual => "casual",
            Style::Creative => "creative",
            Style::Technical => "technical",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub fn as_str(self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }

    /// Capitalised form shown next to the option.
    pub fn label(self) -> &'static str {
        match self {
            Length::Short => "Short",
            Length::Medium => "Medium",
            Length::Long => "Long",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub topic: String,
    pub style: Style,
    pub length: Length,
}

impl FormData {
    pub fn prompt(&self) -> String {
        format!(
            "Generate content about \"{}\" in a {} style. Length: {}.",
            self.topic,
            self.style.as_str(),
            self.length.as_str()
        )
    }
}

/// One generated piece of content, keyed by submission time in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResult {
    pub id: i64,
    pub topic: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct SimpleForm {
    pub data: FormData,
    loading: bool,
    result: Option<String>,
}

impl SimpleForm {
    pub fn new(data: FormData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.data.topic.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Text of the latest submission, or its error.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Generate content for the current form. The returned result replaces
    /// whatever the previous submission produced.
    pub async fn submit(&mut self, prompter: &dyn Prompter) -> Option<FormResult> {
        if self.data.topic.is_empty() {
            return None;
        }
        self.loading = true;
        let request = ClaudeRequest::prompt(self.data.prompt());
        let outcome = match prompter.ask(&request).await {
            Ok(reply) => {
                self.result = Some(reply.response.clone());
                Some(FormResult {
                    id: chrono::Utc::now().timestamp_millis(),
                    topic: self.data.topic.clone(),
                    content: reply.response,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "content generation failed");
                self.result = Some(format!("Error: {e}"));
                None
            }
        };
        self.loading = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::types::ClaudeReply;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoPrompter {
        seen: Mutex<Vec<ClaudeRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl Prompter for EchoPrompter {
        async fn ask(&self, request: &ClaudeRequest) -> Result<ClaudeReply, ClientError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ClientError::Status("Bad Gateway".into()));
            }
            Ok(ClaudeReply {
                response: format!("echo: {}", request.prompt.clone().unwrap_or_default()),
                usage: serde_json::Value::Null,
            })
        }
    }

    #[test]
    fn builds_prompt_from_fields() {
        let data = FormData {
            topic: "rust traits".into(),
            style: Style::Technical,
            length: Length::Short,
        };
        assert_eq!(
            data.prompt(),
            "Generate content about \"rust traits\" in a technical style. Length: short."
        );
    }

    #[test]
    fn defaults_match_initial_form() {
        let data = FormData::default();
        assert_eq!(data.style, Style::Professional);
        assert_eq!(data.length, Length::Medium);
        assert_eq!(Length::Long.label(), "Long");
    }

    #[tokio::test]
    async fn submit_produces_result_and_sends_only_prompt() {
        let prompter = EchoPrompter {
            seen: Mutex::new(Vec::new()),
            fail: false,
        };
        let mut form = SimpleForm::new(FormData {
            topic: "bees".into(),
            ..FormData::default()
        });
        let result = form.submit(&prompter).await.unwrap();
        assert_eq!(result.topic, "bees");
        assert!(result.content.starts_with("echo: Generate content about \"bees\""));
        assert_eq!(form.result(), Some(result.content.as_str()));

        let seen = prompter.seen.lock().unwrap();
        assert_eq!(seen[0].system, None);
        assert_eq!(seen[0].model, None);
    }

    #[tokio::test]
    async fn failure_is_shown_as_result_text() {
        let prompter = EchoPrompter {
            seen: Mutex::new(Vec::new()),
            fail: true,
        };
        let mut form = SimpleForm::new(FormData {
            topic: "bees".into(),
            ..FormData::default()
        });
        assert!(form.submit(&prompter).await.is_none());
        assert_eq!(form.result(), Some("Error: API call failed: Bad Gateway"));
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn empty_topic_is_not_submitted() {
        let prompter = EchoPrompter {
            seen: Mutex::new(Vec::new()),
            fail: false,
        };
        let mut form = SimpleForm::default();
        assert!(!form.can_submit());
        assert!(form.submit(&prompter).await.is_none());
        assert!(prompter.seen.lock().unwrap().is_empty());
    }
}
