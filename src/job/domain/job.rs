//! Job records tracking one submitted generation request.

use super::{JobDomainError, JobId, ParseJobStatusError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Generation is still running.
    Pending,
    /// A result is available.
    Completed,
}

impl JobStatus {
    /// Returns the canonical status string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = ParseJobStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseJobStatusError(value.to_owned())),
        }
    }
}

/// Ephemeral record of one submitted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    id: JobId,
    status: JobStatus,
    created_at: DateTime<Utc>,
    query: String,
    history: Vec<Value>,
    result: Option<String>,
}

impl JobRecord {
    /// Creates a pending record stamped with the clock's current time.
    #[must_use]
    pub fn pending(
        id: JobId,
        query: impl Into<String>,
        history: Vec<Value>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            created_at: clock.utc(),
            query: query.into(),
            history,
            result: None,
        }
    }

    /// Stores the result and marks the record completed.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::AlreadyCompleted`] when a result is already
    /// present; the first result is kept.
    pub fn complete(&mut self, result: impl Into<String>) -> Result<(), JobDomainError> {
        if self.status == JobStatus::Completed {
            return Err(JobDomainError::AlreadyCompleted(self.id));
        }
        self.status = JobStatus::Completed;
        self.result = Some(result.into());
        Ok(())
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the submission time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the submitted query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the submitted history.
    #[must_use]
    pub fn history(&self) -> &[Value] {
        &self.history
    }

    /// Returns the result, once completed.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}
