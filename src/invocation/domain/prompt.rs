//! Instruction message shown to the generation engine.

use super::InvocationDomainError;
use minijinja::{Environment, context};
use serde_json::Value;

const INSTRUCTION_TEMPLATE: &str = concat!(
    "You are a helpful assistant. If prior conversation history is provided, ",
    "use it to maintain context, but do not repeat it back verbatim.",
    "you need to always use the tools you have available to you.",
    "At the end of your response you have to provide:",
    " 1. list of all tools you used in your response. ",
    " 2. web page addresses you used to get the information.",
    "{% if history %}\n\nHistory (raw):\n{{ history }}{% endif %}",
);

/// Instruction appended when the tool-call budget is spent.
pub const BUDGET_EXHAUSTED_INSTRUCTION: &str = "Tool call limit reached. Provide the best possible answer using available information and previously returned tool results.";

/// Renders the instruction message, embedding prior history when present.
///
/// History is embedded as compact JSON. Empty lists, empty objects, empty
/// strings and `null` count as no history.
///
/// # Errors
///
/// Returns [`InvocationDomainError::PromptRender`] when templating fails.
pub fn render_instruction(history: &[Value]) -> Result<String, InvocationDomainError> {
    let history_blob = if history.iter().all(is_blank) {
        String::new()
    } else {
        Value::Array(history.to_vec()).to_string()
    };

    Environment::new()
        .render_str(INSTRUCTION_TEMPLATE, context! { history => history_blob })
        .map_err(|error| InvocationDomainError::PromptRender(error.to_string()))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
