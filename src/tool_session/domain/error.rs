//! Error types for tool-provider domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tool session domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolSessionDomainError {
    /// The server name is empty after trimming.
    #[error("tool server name must not be empty")]
    EmptyServerName,

    /// The server name contains characters outside `[A-Za-z0-9_-]`.
    #[error(
        "tool server name '{0}' contains invalid characters (only alphanumerics, '-' and '_' allowed)"
    )]
    InvalidServerName(String),

    /// The server name exceeds the length a namespaced tool name can carry.
    #[error("tool server name exceeds 32 character limit: {0}")]
    ServerNameTooLong(String),

    /// The registry entry has no address.
    #[error("tool server '{0}' has no address")]
    MissingAddress(String),

    /// The registry entry address is not an absolute `http(s)` URL.
    #[error("tool server '{name}' has invalid address '{address}': {reason}")]
    InvalidAddress {
        /// Server name from the registry entry.
        name: String,
        /// Address as written in the registry.
        address: String,
        /// Parser or scheme diagnostic.
        reason: String,
    },

    /// A tool descriptor name is empty after trimming.
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// Backoff settings are inconsistent.
    #[error("backoff base delay {base_ms}ms exceeds maximum delay {max_ms}ms")]
    InvalidBackoff {
        /// Base delay in milliseconds.
        base_ms: u128,
        /// Maximum delay in milliseconds.
        max_ms: u128,
    },
}

/// Error returned while parsing health status text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown tool server health status: {0}")]
pub struct ParseHealthStatusError(pub String);
