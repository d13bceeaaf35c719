//! Callable tool specifications presented to the generation engine.

use crate::tool_session::domain::{ToolDescriptor, ToolServerName};
use serde_json::{Value, json};

/// A namespaced tool in function-calling form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpecification {
    name: String,
    description: String,
    parameters: Value,
}

impl ToolSpecification {
    /// Translates a server-reported descriptor.
    ///
    /// The name is prefixed with the owning server; an absent or empty
    /// schema becomes an empty object schema.
    #[must_use]
    pub fn from_descriptor(server: &ToolServerName, tool: &ToolDescriptor) -> Self {
        Self {
            name: server.namespace(tool.name()),
            description: tool.description().to_owned(),
            parameters: tool.input_schema().to_parameters(),
        }
    }

    /// Returns the namespaced name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON schema of the parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Renders `{type: "function", function: {name, description, parameters}}`.
    #[must_use]
    pub fn to_function_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            },
        })
    }
}
