//! Port for the workflow that produces a job's reply.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for reply generation.
pub type ReplyGenerationResult<T> = Result<T, ReplyGenerationError>;

/// Produces the reply for a submitted query.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generates the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyGenerationError`] when no reply could be produced.
    async fn generate_reply(&self, query: &str, history: &[Value]) -> ReplyGenerationResult<String>;
}

/// Failure of the reply workflow.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ReplyGenerationError(Arc<dyn std::error::Error + Send + Sync>);

impl ReplyGenerationError {
    /// Wraps the workflow failure.
    #[must_use]
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
