//! Domain errors for the invocation context.

use thiserror::Error;

/// Errors raised while preparing a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationDomainError {
    /// The instruction template failed to render.
    #[error("failed to render instruction message: {0}")]
    PromptRender(String),
}
