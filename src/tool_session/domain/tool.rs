//! Tool descriptors reported by connected tool-provider servers.

use super::ToolSessionDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Parameter schema shapes a tool-provider may report for a tool.
///
/// Servers publish `inputSchema` as a JSON Schema object, omit it, or (for
/// tools that accept anything) publish a boolean schema. Each shape has its
/// own translation into the parameters object handed to the generation
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "schema", rename_all = "snake_case")]
pub enum ToolInputSchema {
    /// A JSON Schema object with at least one keyword.
    Object(Map<String, Value>),
    /// A boolean schema (`true` accepts any input, `false` none).
    Boolean(bool),
    /// No usable schema was reported.
    Absent,
}

impl ToolInputSchema {
    /// Classifies a raw `inputSchema` value by shape.
    #[must_use]
    pub fn from_reported(value: Option<Value>) -> Self {
        match value {
            Some(Value::Object(map)) if !map.is_empty() => Self::Object(map),
            Some(Value::Bool(flag)) => Self::Boolean(flag),
            _ => Self::Absent,
        }
    }

    /// Translates the schema into a function-parameters object.
    #[must_use]
    pub fn to_parameters(&self) -> Value {
        match self {
            Self::Object(map) => object_parameters(map),
            Self::Boolean(flag) => boolean_parameters(*flag),
            Self::Absent => empty_object_schema(),
        }
    }
}

fn object_parameters(map: &Map<String, Value>) -> Value {
    Value::Object(map.clone())
}

fn boolean_parameters(accepts_anything: bool) -> Value {
    if accepts_anything {
        json!({"type": "object", "properties": {}, "additionalProperties": true})
    } else {
        json!({"type": "object", "properties": {}, "additionalProperties": false})
    }
}

/// Returns the schema used when a tool reports no parameters.
#[must_use]
pub fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Canonical metadata for a tool exposed by a tool-provider server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: ToolInputSchema,
}

impl ToolDescriptor {
    /// Creates a tool descriptor.
    ///
    /// The description may be empty; servers are not required to document
    /// their tools.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSessionDomainError::EmptyToolName`] when the name is
    /// blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ToolInputSchema,
    ) -> Result<Self, ToolSessionDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ToolSessionDomainError::EmptyToolName);
        }

        Ok(Self {
            name: normalized_name,
            description: description.into().trim().to_owned(),
            input_schema,
        })
    }

    /// Returns the tool name as reported by its server.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the reported input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &ToolInputSchema {
        &self.input_schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(Value::Null))]
    #[case(Some(json!({})))]
    #[case(Some(json!("string")))]
    fn absent_shapes_translate_to_empty_object(#[case] reported: Option<Value>) {
        let schema = ToolInputSchema::from_reported(reported);
        assert_eq!(schema, ToolInputSchema::Absent);
        assert_eq!(schema.to_parameters(), empty_object_schema());
    }

    #[test]
    fn object_schema_is_passed_through() {
        let reported = json!({"type": "object", "properties": {"url": {"type": "string"}}});
        let schema = ToolInputSchema::from_reported(Some(reported.clone()));
        assert_eq!(schema.to_parameters(), reported);
    }

    #[test]
    fn boolean_schema_becomes_open_object() {
        let schema = ToolInputSchema::from_reported(Some(Value::Bool(true)));
        assert_eq!(
            schema.to_parameters()["additionalProperties"],
            Value::Bool(true)
        );
    }

    #[test]
    fn blank_tool_name_is_rejected() {
        assert_eq!(
            ToolDescriptor::new("  ", "desc", ToolInputSchema::Absent),
            Err(ToolSessionDomainError::EmptyToolName)
        );
    }
}
