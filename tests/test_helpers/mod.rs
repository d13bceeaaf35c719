//! Shared reply generators for job integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thinkwell::job::ports::{ReplyGenerationError, ReplyGenerationResult, ReplyGenerator};
use tokio::sync::Semaphore;

/// Reply generator that holds every reply until [`GatedGenerator::release`].
#[derive(Clone)]
pub struct GatedGenerator {
    gate: Arc<Semaphore>,
    reply: Result<String, String>,
}

impl GatedGenerator {
    /// Answers `reply` once released.
    pub fn answering(reply: impl Into<String>) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            reply: Ok(reply.into()),
        }
    }

    /// Fails with `message` once released.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            reply: Err(message.into()),
        }
    }

    /// Lets one pending generation finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl ReplyGenerator for GatedGenerator {
    async fn generate_reply(
        &self,
        query: &str,
        _history: &[Value],
    ) -> ReplyGenerationResult<String> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(ReplyGenerationError::failed)?;
        permit.forget();
        match &self.reply {
            Ok(reply) => Ok(format!("{reply} ({query})")),
            Err(message) => Err(ReplyGenerationError::failed(std::io::Error::other(
                message.clone(),
            ))),
        }
    }
}
