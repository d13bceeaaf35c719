//! Readiness probe results for tool-provider servers.

use super::ParseHealthStatusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness verdict returned by a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// A candidate endpoint answered with a success status.
    Healthy,
    /// No candidate endpoint answered successfully.
    Unhealthy,
}

impl HealthStatus {
    /// Returns the canonical text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HealthStatus {
    type Error = ParseHealthStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            _ => Err(ParseHealthStatusError(value.to_owned())),
        }
    }
}

/// Timestamped outcome of one health probe pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    status: HealthStatus,
    checked_at: DateTime<Utc>,
    endpoint: Option<String>,
    message: Option<String>,
}

impl HealthSnapshot {
    /// Creates a `healthy` snapshot naming the endpoint that answered.
    #[must_use]
    pub fn healthy(checked_at: DateTime<Utc>, endpoint: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            checked_at,
            endpoint: Some(endpoint.into()),
            message: None,
        }
    }

    /// Creates an `unhealthy` snapshot with the last failure reason.
    #[must_use]
    pub fn unhealthy(checked_at: DateTime<Utc>, message: impl Into<String>) -> Self {
        let normalized = message.into().trim().to_owned();
        Self {
            status: HealthStatus::Unhealthy,
            checked_at,
            endpoint: None,
            message: (!normalized.is_empty()).then_some(normalized),
        }
    }

    /// Returns the probe verdict.
    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        self.status
    }

    /// Returns whether the server is ready for a session handshake.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }

    /// Returns when the probe finished.
    #[must_use]
    pub const fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Returns the endpoint that answered, when healthy.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the failure detail, when unhealthy.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
