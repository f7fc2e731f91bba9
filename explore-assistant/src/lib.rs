pub mod chat;
pub mod gemini;
pub mod prompt;
pub mod sse;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use chat::{ChatMessage, ChatRole, ChatSession, Source, APOLOGY, GREETING, SUGGESTIONS};
pub use gemini::{GeminiClient, GeminiConfig};

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Assistant is not configured: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode stream chunk: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Assistant API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// One streamed increment of a model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyChunk {
    pub text: String,
    pub sources: Vec<Source>,
}

pub type ReplyStream = BoxStream<'static, Result<ReplyChunk, AssistantError>>;

/// A generative-text service that can continue a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `history` holds the completed turns, ending with the new user message.
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<ReplyStream, AssistantError>;
}
