//! Chat transcript kept for one session.

use serde::{Deserialize, Serialize};

use crate::client::Prompter;
use crate::types::ClaudeRequest;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant in a hackathon project.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation held for one session.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    input: String,
    loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Send the pending input.
    ///
    /// Blank input is ignored. Otherwise one `user` entry is appended, the
    /// input is cleared, and exactly one `assistant` or `error` entry follows
    /// once the prompter answers. Returns the number of entries appended.
    pub async fn send(&mut self, prompter: &dyn Prompter) -> usize {
        if self.input.trim().is_empty() {
            return 0;
        }
        let prompt = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage {
            role: Role::User,
            content: prompt.clone(),
        });
        self.loading = true;

        let request = ClaudeRequest::prompt(prompt).system(CHAT_SYSTEM_PROMPT);
        let reply = match prompter.ask(&request).await {
            Ok(reply) => ChatMessage {
                role: Role::Assistant,
                content: reply.response,
            },
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                ChatMessage {
                    role: Role::Error,
                    content: format!("Error: {e}"),
                }
            }
        };
        self.messages.push(reply);
        self.loading = false;
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::types::ClaudeReply;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedPrompter {
        replies: Mutex<Vec<Result<ClaudeReply, ClientError>>>,
        seen: Mutex<Vec<ClaudeRequest>>,
    }

    impl ScriptedPrompter {
        fn new(replies: Vec<Result<ClaudeReply, ClientError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Prompter for ScriptedPrompter {
        async fn ask(&self, request: &ClaudeRequest) -> Result<ClaudeReply, ClientError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn reply(text: &str) -> Result<ClaudeReply, ClientError> {
        Ok(ClaudeReply {
            response: text.into(),
            usage: json!({}),
        })
    }

    #[tokio::test]
    async fn appends_user_then_assistant_in_order() {
        let prompter = ScriptedPrompter::new(vec![reply("first"), reply("second")]);
        let mut chat = ChatSession::new();

        chat.set_input("one");
        assert_eq!(chat.send(&prompter).await, 2);
        chat.set_input("two");
        chat.send(&prompter).await;

        let roles: Vec<Role> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(chat.messages()[1].content, "first");
        assert_eq!(chat.messages()[3].content, "second");
        assert!(chat.input().is_empty());
        assert!(!chat.is_loading());

        let seen = prompter.seen.lock().unwrap();
        assert_eq!(seen[0].system.as_deref(), Some(CHAT_SYSTEM_PROMPT));
        assert_eq!(seen[0].prompt.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn failure_appends_error_entry() {
        let prompter = ScriptedPrompter::new(vec![Err(ClientError::Remote(
            "Failed to get response from Claude".into(),
        ))]);
        let mut chat = ChatSession::new();
        chat.set_input("hello");
        chat.send(&prompter).await;

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].role, Role::Error);
        assert_eq!(
            chat.messages()[1].content,
            "Error: Failed to get response from Claude"
        );
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let prompter = ScriptedPrompter::new(Vec::new());
        let mut chat = ChatSession::new();
        chat.set_input("   ");
        assert!(!chat.can_send());
        assert_eq!(chat.send(&prompter).await, 0);
        assert!(chat.messages().is_empty());
        assert!(prompter.seen.lock().unwrap().is_empty());
    }
}
