//! Registry port for discovering tool-provider servers.

use crate::tool_session::domain::ToolServerEntry;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry operations.
pub type ToolServerRegistryResult<T> = Result<T, ToolServerRegistryError>;

/// Source of tool-provider server declarations.
#[async_trait]
pub trait ToolServerRegistry: Send + Sync {
    /// Loads every declared server entry, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolServerRegistryError::NotFound`] when the registry
    /// document does not exist, or read and parse failures otherwise.
    async fn load_entries(&self) -> ToolServerRegistryResult<Vec<ToolServerEntry>>;
}

/// Errors returned by registry adapters.
#[derive(Debug, Clone, Error)]
pub enum ToolServerRegistryError {
    /// The registry document does not exist.
    #[error("tool server registry not found at {0}")]
    NotFound(String),

    /// The registry document exists but could not be read.
    #[error("failed to read tool server registry at {location}: {source}")]
    Unreadable {
        /// Registry location.
        location: String,
        /// Underlying read failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The registry document is not valid.
    #[error("malformed tool server registry at {location}: {source}")]
    Malformed {
        /// Registry location.
        location: String,
        /// Underlying parse failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl ToolServerRegistryError {
    /// Wraps a read failure.
    pub fn unreadable(
        location: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unreadable {
            location: location.into(),
            source: Arc::new(err),
        }
    }

    /// Wraps a parse failure.
    pub fn malformed(
        location: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Malformed {
            location: location.into(),
            source: Arc::new(err),
        }
    }
}
