//! AI provider port - interface to the text-generation backend.
//!
//! The backend is a black box with two capabilities: streaming free-form
//! reply generation, and a structured-extraction call that returns one JSON
//! object conforming to a caller-supplied schema. Adapters translate between
//! a concrete vendor API and these types.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Stream of reply chunks from the backend.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<ReplyChunk, AiError>> + Send>>;

/// Port for the text-generation backend.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generates a streaming conversational reply.
    async fn stream_reply(&self, request: ReplyRequest) -> Result<ReplyStream, AiError>;

    /// Runs a structured-extraction call.
    ///
    /// The backend is instructed to answer with a single JSON object
    /// matching `request.schema`. The raw value is returned; strict decoding
    /// is the caller's responsibility.
    async fn extract_structured(
        &self,
        request: ExtractionRequest,
    ) -> Result<serde_json::Value, AiError>;

    /// Provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a streaming reply.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    /// System prompt assembled from the stage directives.
    pub system_prompt: String,
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl ReplyRequest {
    /// Creates a reply request.
    pub fn new(system_prompt: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            max_tokens: 1024,
        }
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Request for a structured extraction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Instructions including the transcript window and any rubric.
    pub prompt: String,
    /// JSON schema the response object must conform to.
    pub schema: serde_json::Value,
    /// Maximum tokens for the JSON answer.
    pub max_tokens: u32,
}

impl ExtractionRequest {
    /// Creates an extraction request.
    pub fn new(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
            max_tokens: 1024,
        }
    }
}

/// A message in provider wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a chat message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One streamed chunk of a reply.
#[derive(Debug, Clone)]
pub struct ReplyChunk {
    /// New content in this chunk.
    pub delta: String,
    /// True once the backend finished generating.
    pub is_final: bool,
}

impl ReplyChunk {
    /// Creates a content chunk.
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            is_final: false,
        }
    }

    /// Creates the terminal chunk.
    pub fn final_chunk() -> Self {
        Self {
            delta: String::new(),
            is_final: true,
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "anthropic").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AiError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AiError::RateLimited { .. }
                | AiError::Unavailable { .. }
                | AiError::Network(_)
                | AiError::Timeout { .. }
        )
    }
}
