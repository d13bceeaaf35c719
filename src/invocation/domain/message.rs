//! Conversation messages exchanged with the generation engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// Instruction text.
    System,
    /// End-user text.
    User,
    /// Generation engine output.
    Assistant,
    /// Tool result.
    Tool,
}

impl ChatRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A tool call requested by the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Engine-assigned call identifier, when supplied.
    pub id: Option<String>,
    /// Namespaced tool name.
    pub name: String,
    /// Call arguments.
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Creates a tool call request.
    #[must_use]
    pub fn new(id: Option<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id,
            name: name.into(),
            arguments,
        }
    }

    /// Identifier used to correlate the tool-result message.
    ///
    /// Falls back to the tool name, then to `"tool"`.
    #[must_use]
    pub fn correlation_id(&self) -> String {
        match (&self.id, self.name.is_empty()) {
            (Some(id), _) if !id.is_empty() => id.clone(),
            (_, false) => self.name.clone(),
            (_, true) => "tool".to_owned(),
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Instruction message.
    System {
        /// Message text.
        content: String,
    },
    /// User message.
    User {
        /// Message text.
        content: String,
    },
    /// Engine response, possibly requesting tool calls.
    Assistant {
        /// Response text.
        content: Option<String>,
        /// Requested tool calls, in request order.
        tool_calls: Vec<ToolCallRequest>,
    },
    /// Result of one tool call.
    Tool {
        /// Correlation identifier of the originating call.
        call_id: String,
        /// Result or error text.
        content: String,
    },
}

impl ChatMessage {
    /// Creates an instruction message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Creates a tool-result message.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    /// Returns the author role.
    #[must_use]
    pub const fn role(&self) -> ChatRole {
        match self {
            Self::System { .. } => ChatRole::System,
            Self::User { .. } => ChatRole::User,
            Self::Assistant { .. } => ChatRole::Assistant,
            Self::Tool { .. } => ChatRole::Tool,
        }
    }

    /// Returns the message text; empty for a content-less engine response.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::User { content } | Self::Tool { content, .. } => {
                content
            }
            Self::Assistant { content, .. } => content.as_deref().unwrap_or_default(),
        }
    }
}

/// A generation engine response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Response text.
    pub content: Option<String>,
    /// Requested tool calls, in request order.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatCompletion {
    /// Creates a final textual answer.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a response requesting tool calls.
    #[must_use]
    pub const fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Returns whether the engine asked for any tool call.
    #[must_use]
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Returns the response text, empty when absent.
    #[must_use]
    pub fn text_or_empty(&self) -> String {
        self.content.clone().unwrap_or_default()
    }

    /// Converts the response into an assistant message.
    #[must_use]
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::Assistant {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

/// Renders messages as `"<role>: <content>"` lines, skipping the leading
/// instruction message.
#[must_use]
pub fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .skip(1)
        .map(|message| format!("{}: {}", message.role().as_str(), message.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Some("call_1"), "web_docs__fetch", "call_1")]
    #[case(None, "web_docs__fetch", "web_docs__fetch")]
    #[case(Some(""), "web_docs__fetch", "web_docs__fetch")]
    #[case(None, "", "tool")]
    fn correlation_id_falls_back(
        #[case] id: Option<&str>,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        let call = ToolCallRequest::new(id.map(str::to_owned), name, json!({}));

        assert_eq!(call.correlation_id(), expected);
    }

    #[test]
    fn transcript_skips_instruction_and_labels_roles() {
        let messages = vec![
            ChatMessage::system("be helpful"),
            ChatMessage::user("what day is it?"),
            ChatCompletion::tool_calls(vec![ToolCallRequest::new(
                Some("c1".to_owned()),
                "date__now",
                json!({}),
            )])
            .to_message(),
            ChatMessage::tool_result("c1", "[]"),
        ];

        assert_eq!(
            transcript(&messages),
            "user: what day is it?\nassistant: \ntool: []"
        );
    }
}
