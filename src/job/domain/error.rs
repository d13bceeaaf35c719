//! Error types for job domain validation and parsing.

use super::JobId;
use thiserror::Error;

/// Errors returned while constructing or mutating job values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobDomainError {
    /// The identifier is not a UUID.
    #[error("invalid job identifier '{0}'")]
    InvalidJobId(String),

    /// The job already holds a result.
    #[error("job {0} is already completed")]
    AlreadyCompleted(JobId),
}

/// Error returned while parsing job statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job status: {0}")]
pub struct ParseJobStatusError(pub String);
