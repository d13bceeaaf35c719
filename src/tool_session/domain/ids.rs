//! Validated-name type for tool-provider servers.

use super::ToolSessionDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum server name length.
///
/// Namespaced tool names are `<server>__<tool>` and generation engines cap
/// function names at 64 characters, so the server prefix is kept short.
const MAX_SERVER_NAME_LENGTH: usize = 32;

/// Separator placed between a server name and a tool name.
pub const NAMESPACE_SEPARATOR: &str = "__";

/// Validated tool-provider server name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolServerName(String);

impl ToolServerName {
    /// Creates a validated server name.
    ///
    /// The input is trimmed. Only characters in `[A-Za-z0-9_-]` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSessionDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, ToolSessionDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(ToolSessionDomainError::EmptyServerName);
        }

        let is_valid = normalized.chars().all(|character| {
            character.is_ascii_alphanumeric() || character == '_' || character == '-'
        });
        if !is_valid {
            return Err(ToolSessionDomainError::InvalidServerName(normalized));
        }

        if normalized.len() > MAX_SERVER_NAME_LENGTH {
            return Err(ToolSessionDomainError::ServerNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the namespaced form of a tool exposed by this server.
    #[must_use]
    pub fn namespace(&self, tool_name: &str) -> String {
        format!("{}{NAMESPACE_SEPARATOR}{tool_name}", self.0)
    }
}

impl TryFrom<String> for ToolServerName {
    type Error = ToolSessionDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToolServerName> for String {
    fn from(value: ToolServerName) -> Self {
        value.0
    }
}

impl AsRef<str> for ToolServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ToolServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("web_docs", "web_docs")]
    #[case("  date  ", "date")]
    #[case("Search-Engine_2", "Search-Engine_2")]
    fn accepts_valid_names(#[case] input: &str, #[case] expected: &str) {
        let name = ToolServerName::new(input).expect("name should be valid");
        assert_eq!(name.as_str(), expected);
    }

    #[rstest]
    #[case("", ToolSessionDomainError::EmptyServerName)]
    #[case("   ", ToolSessionDomainError::EmptyServerName)]
    #[case("web docs", ToolSessionDomainError::InvalidServerName("web docs".to_owned()))]
    #[case("a.b", ToolSessionDomainError::InvalidServerName("a.b".to_owned()))]
    fn rejects_invalid_names(#[case] input: &str, #[case] expected: ToolSessionDomainError) {
        assert_eq!(ToolServerName::new(input), Err(expected));
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "s".repeat(MAX_SERVER_NAME_LENGTH + 1);
        assert!(matches!(
            ToolServerName::new(long),
            Err(ToolSessionDomainError::ServerNameTooLong(_))
        ));
    }

    #[test]
    fn namespace_joins_with_double_underscore() {
        let name = ToolServerName::new("date").expect("valid name");
        assert_eq!(name.namespace("date_now"), "date__date_now");
    }
}
