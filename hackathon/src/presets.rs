//! Model identifiers, canned system prompts and token estimation.

pub mod models {
    /// Fast and cheap; the proxy default.
    pub const HAIKU: &str = "claude-3-5-haiku-20241022";
    pub const SONNET_OLD: &str = "claude-3-sonnet-20240229";
    /// Most capable.
    pub const OPUS: &str = "claude-3-opus-20240229";
}

pub mod system_prompts {
    pub const CREATIVE: &str = "You are a creative writing assistant. Be imaginative and engaging.";
    pub const ANALYTICAL: &str =
        "You are an analytical assistant. Provide detailed, logical analysis.";
    pub const CODER: &str =
        "You are an expert programming assistant. Provide clean, efficient code.";
    pub const EDUCATOR: &str =
        "You are an educational assistant. Explain concepts clearly and thoroughly.";
}

/// System prompt used by the proxy when the caller sends none.
pub const DEFAULT_SYSTEM: &str = "You are a helpful assistant.";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Rough token count: one token per four characters, rounded up.
///
/// ```
/// use hackathon::presets::estimate_tokens;
/// assert_eq!(estimate_tokens("hello"), 2);
/// assert_eq!(estimate_tokens(""), 0);
/// ```
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
