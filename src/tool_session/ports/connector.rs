//! Connector port for probing servers and opening sessions.

use super::{ResourceScope, ToolSession};
use crate::tool_session::domain::{HealthSnapshot, ToolServerDescriptor, ToolServerName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for connector operations.
pub type ToolServerConnectResult<T> = Result<T, ToolServerConnectError>;

/// Transport-level contract for reaching tool-provider servers.
#[async_trait]
pub trait ToolServerConnector: Send + Sync {
    /// Performs a lightweight readiness check.
    ///
    /// Probing never opens stateful resources and never fails outright; an
    /// unreachable server yields an unhealthy snapshot.
    async fn probe(&self, server: &ToolServerDescriptor) -> HealthSnapshot;

    /// Opens the transport and performs the session handshake.
    ///
    /// Every resource that needs explicit teardown must be acquired into
    /// `scope` as soon as it exists, so a failed handshake leaves nothing
    /// behind once the caller releases the scope.
    ///
    /// # Errors
    ///
    /// Returns [`ToolServerConnectError`] when the transport cannot be opened
    /// or the handshake is rejected.
    async fn open(
        &self,
        server: &ToolServerDescriptor,
        scope: &mut ResourceScope,
    ) -> ToolServerConnectResult<Arc<dyn ToolSession>>;
}

/// Errors raised while establishing a session.
#[derive(Debug, Clone, Error)]
pub enum ToolServerConnectError {
    /// The readiness probe did not succeed.
    #[error("tool server {server} is not ready: {reason}")]
    Unhealthy {
        /// Server name.
        server: ToolServerName,
        /// Last probe failure.
        reason: String,
    },

    /// The server rejected or broke off the handshake.
    #[error("handshake with tool server {server} failed: {reason}")]
    Handshake {
        /// Server name.
        server: ToolServerName,
        /// Failure detail.
        reason: String,
    },

    /// Transport failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolServerConnectError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
