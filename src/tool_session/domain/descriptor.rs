//! Tool-provider server registry entries and validated descriptors.

use super::{ToolServerName, ToolSessionDomainError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name assigned to registry entries that omit one.
pub const UNKNOWN_SERVER_NAME: &str = "unknown_server";

/// Raw server entry as written in the registry document.
///
/// Entries are validated into [`ToolServerDescriptor`] before any network
/// activity happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServerEntry {
    /// Declared server name.
    #[serde(default = "default_entry_name")]
    pub name: String,
    /// Declared server address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

fn default_entry_name() -> String {
    UNKNOWN_SERVER_NAME.to_owned()
}

impl ToolServerEntry {
    /// Creates a registry entry with an address.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: Some(address.into()),
        }
    }

    /// Creates a registry entry that lacks an address.
    #[must_use]
    pub fn without_address(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }
}

/// Validated tool-provider server descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolServerDescriptor {
    name: ToolServerName,
    address: Url,
}

impl ToolServerDescriptor {
    /// Creates a descriptor from a validated name and address.
    #[must_use]
    pub const fn new(name: ToolServerName, address: Url) -> Self {
        Self { name, address }
    }

    /// Validates a raw registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSessionDomainError::MissingAddress`] when the entry has
    /// no (or a blank) address, name validation errors, or
    /// [`ToolSessionDomainError::InvalidAddress`] when the address is not an
    /// absolute `http`/`https` URL.
    pub fn try_from_entry(entry: &ToolServerEntry) -> Result<Self, ToolSessionDomainError> {
        let raw_address = entry
            .address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .ok_or_else(|| ToolSessionDomainError::MissingAddress(entry.name.clone()))?;

        let name = ToolServerName::new(entry.name.as_str())?;
        let address =
            Url::parse(raw_address).map_err(|error| ToolSessionDomainError::InvalidAddress {
                name: entry.name.clone(),
                address: raw_address.to_owned(),
                reason: error.to_string(),
            })?;

        if !matches!(address.scheme(), "http" | "https") {
            return Err(ToolSessionDomainError::InvalidAddress {
                name: entry.name.clone(),
                address: raw_address.to_owned(),
                reason: format!("unsupported scheme '{}'", address.scheme()),
            });
        }

        Ok(Self::new(name, address))
    }

    /// Returns the server name.
    #[must_use]
    pub const fn name(&self) -> &ToolServerName {
        &self.name
    }

    /// Returns the server address.
    #[must_use]
    pub const fn address(&self) -> &Url {
        &self.address
    }
}

impl fmt::Display for ToolServerDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({})", self.name, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn entry_without_name_defaults_to_unknown_server() {
        let entry: ToolServerEntry =
            serde_json::from_str(r#"{"address": "http://localhost:8801/mcp"}"#)
                .expect("entry should deserialize");
        assert_eq!(entry.name, UNKNOWN_SERVER_NAME);
    }

    #[test]
    fn valid_entry_becomes_descriptor() {
        let entry = ToolServerEntry::new("web_docs", "http://localhost:8801/web_docs/mcp");
        let descriptor = ToolServerDescriptor::try_from_entry(&entry).expect("valid entry");

        assert_eq!(descriptor.name().as_str(), "web_docs");
        assert_eq!(descriptor.address().path(), "/web_docs/mcp");
    }

    #[rstest]
    #[case(ToolServerEntry::without_address("date"))]
    #[case(ToolServerEntry::new("date", "   "))]
    fn missing_address_is_reported(#[case] entry: ToolServerEntry) {
        assert_eq!(
            ToolServerDescriptor::try_from_entry(&entry),
            Err(ToolSessionDomainError::MissingAddress("date".to_owned()))
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://localhost/mcp")]
    fn invalid_address_is_reported(#[case] address: &str) {
        let entry = ToolServerEntry::new("date", address);
        assert!(matches!(
            ToolServerDescriptor::try_from_entry(&entry),
            Err(ToolSessionDomainError::InvalidAddress { .. })
        ));
    }
}
