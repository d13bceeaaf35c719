//! Generation engine port.

use crate::invocation::domain::{ChatCompletion, ChatMessage, ToolSpecification};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for generation engine calls.
pub type ChatModelResult<T> = Result<T, ChatModelError>;

/// Whether the engine may request tool calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    /// The engine decides.
    #[default]
    Auto,
    /// The engine must answer in text.
    None,
}

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Callable tools; empty for a plain call.
    pub tools: Vec<ToolSpecification>,
    /// Tool access for this call.
    pub tool_choice: ToolChoice,
}

impl ChatRequest {
    /// Builds a request without any tool catalog.
    #[must_use]
    pub fn plain(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::None,
        }
    }

    /// Builds a request offering `tools` under `tool_choice`.
    #[must_use]
    pub const fn with_tools(
        messages: Vec<ChatMessage>,
        tools: Vec<ToolSpecification>,
        tool_choice: ToolChoice,
    ) -> Self {
        Self {
            messages,
            tools,
            tool_choice,
        }
    }
}

/// Contract for the language-generation service.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produces either a final answer or a set of requested tool calls.
    ///
    /// # Errors
    ///
    /// Returns [`ChatModelError`] when the engine cannot be reached or its
    /// answer cannot be interpreted.
    async fn complete(&self, request: &ChatRequest) -> ChatModelResult<ChatCompletion>;
}

/// Errors returned by generation engine adapters.
#[derive(Debug, Clone, Error)]
pub enum ChatModelError {
    /// The engine answered with an error status.
    #[error("generation engine returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The engine's answer did not have the expected shape.
    #[error("invalid generation engine response: {0}")]
    InvalidResponse(String),

    /// The engine is not available.
    #[error("generation engine unavailable: {0}")]
    Unavailable(String),

    /// Transport failure.
    #[error("generation engine transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChatModelError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
