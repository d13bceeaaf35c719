//! Port contracts for the invocation context.

mod chat_model;

pub use chat_model::{ChatModel, ChatModelError, ChatModelResult, ChatRequest, ToolChoice};
