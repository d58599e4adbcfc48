//! Claude hackathon toolkit.
//!
//! A single proxy endpoint ([`ClaudeProxy`]) forwards prompts to the hosted
//! Messages API, and the [`chat`], [`form`] and [`cards`] modules hold the
//! interaction state that drives it through a [`ProxyClient`].

pub mod anthropic;
pub mod cards;
pub mod chat;
pub mod client;
pub mod form;
pub mod home;
pub mod presets;
pub mod proxy;
pub mod server;
pub mod types;

pub use anthropic::{AnthropicClient, MessageRequest, MessageResponse, MessagesApi, UpstreamError};
pub use cards::Card;
pub use chat::{ChatMessage, ChatSession, Role};
pub use client::{CallOptions, ClientError, Prompter, ProxyClient};
pub use form::{FormData, FormResult, Length, SimpleForm, Style};
pub use home::{Home, View};
pub use proxy::{ClaudeProxy, ProxyError};
pub use types::{ClaudeReply, ClaudeRequest, ErrorBody};
