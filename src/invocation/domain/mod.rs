//! Domain model for tool invocation runs.

mod catalog;
mod error;
mod message;
mod outcome;
mod prompt;

pub use catalog::ToolSpecification;
pub use error::InvocationDomainError;
pub use message::{ChatCompletion, ChatMessage, ChatRole, ToolCallRequest, transcript};
pub use outcome::RunOutcome;
pub use prompt::{BUDGET_EXHAUSTED_INSTRUCTION, render_instruction};
