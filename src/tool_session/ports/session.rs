//! Session port for talking to a connected tool-provider server.

use crate::tool_session::domain::{HealthSnapshot, ToolDescriptor, ToolServerDescriptor, ToolServerName};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for session operations.
pub type ToolSessionResult<T> = Result<T, ToolSessionError>;

/// An established protocol session with one tool-provider server.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Lists the tools the server currently exposes.
    async fn list_tools(&self) -> ToolSessionResult<Vec<ToolDescriptor>>;

    /// Invokes a tool by its server-local name.
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolSessionResult<ToolCallOutput>;
}

/// Content blocks returned by a successful tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallOutput {
    content: Vec<Value>,
}

impl ToolCallOutput {
    /// Wraps the content blocks returned by the server.
    #[must_use]
    pub const fn new(content: Vec<Value>) -> Self {
        Self { content }
    }

    /// Creates an output holding a single text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![serde_json::json!({"type": "text", "text": text.into()})])
    }

    /// Returns the raw content blocks.
    #[must_use]
    pub fn content(&self) -> &[Value] {
        &self.content
    }

    /// Serialises the content blocks for a tool-result message.
    #[must_use]
    pub fn to_message_text(&self) -> String {
        Value::Array(self.content.clone()).to_string()
    }
}

/// Errors returned by tool sessions.
#[derive(Debug, Clone, Error)]
pub enum ToolSessionError {
    /// The tool reported a failure result.
    #[error("tool '{tool}' failed: {message}")]
    ToolFailed {
        /// Server-local tool name.
        tool: String,
        /// Failure text reported by the tool.
        message: String,
    },

    /// The server answered with a protocol-level error.
    #[error("protocol error {code}: {message}")]
    Protocol {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The server response could not be interpreted.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The session has been released.
    #[error("session with tool server {0} is closed")]
    Closed(ToolServerName),

    /// Transport failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolSessionError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// A session that passed its health probe and handshake.
///
/// The underlying resources are owned by the session manager; this value is
/// a cheap handle into them.
#[derive(Clone)]
pub struct ConnectedSession {
    descriptor: ToolServerDescriptor,
    session: Arc<dyn ToolSession>,
    health: HealthSnapshot,
    connected_at: DateTime<Utc>,
}

impl ConnectedSession {
    /// Creates a connected session handle.
    #[must_use]
    pub fn new(
        descriptor: ToolServerDescriptor,
        session: Arc<dyn ToolSession>,
        health: HealthSnapshot,
        connected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            descriptor,
            session,
            health,
            connected_at,
        }
    }

    /// Returns the server name.
    #[must_use]
    pub const fn name(&self) -> &ToolServerName {
        self.descriptor.name()
    }

    /// Returns the server descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ToolServerDescriptor {
        &self.descriptor
    }

    /// Returns the session handle.
    #[must_use]
    pub fn session(&self) -> Arc<dyn ToolSession> {
        Arc::clone(&self.session)
    }

    /// Returns the health probe result that admitted this session.
    #[must_use]
    pub const fn health(&self) -> &HealthSnapshot {
        &self.health
    }

    /// Returns when the handshake completed.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

impl fmt::Debug for ConnectedSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConnectedSession")
            .field("name", self.descriptor.name())
            .field("address", &self.descriptor.address().as_str())
            .field("health", &self.health.status())
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Provider of the currently usable session set.
#[async_trait]
pub trait ConnectedSessionSource: Send + Sync {
    /// Returns the current session snapshot, connecting first if needed.
    async fn connected_sessions(&self) -> Arc<[ConnectedSession]>;
}
