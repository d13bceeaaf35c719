//! Store port for job records.

use crate::job::domain::{JobId, JobRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job store operations.
pub type JobStoreResult<T> = Result<T, JobStoreError>;

/// Job record storage contract.
///
/// Implementations serialize every operation, so a reader sees a record
/// either before or after [`JobStore::set_result`], never in between.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts a new pending record.
    ///
    /// # Errors
    ///
    /// Returns [`JobStoreError::DuplicateJob`] when the identifier exists.
    async fn create_job(&self, record: JobRecord) -> JobStoreResult<()>;

    /// Completes a pending record.
    ///
    /// Unknown identifiers are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`JobStoreError::AlreadyCompleted`] when the record already
    /// holds a result.
    async fn set_result(&self, id: JobId, result: String) -> JobStoreResult<()>;

    /// Returns a copy of the record, if present.
    async fn get_job(&self, id: JobId) -> JobStoreResult<Option<JobRecord>>;

    /// Removes the record. Returns whether it was present.
    async fn delete_job(&self, id: JobId) -> JobStoreResult<bool>;
}

/// Errors returned by job store implementations.
#[derive(Debug, Clone, Error)]
pub enum JobStoreError {
    /// A record with the same identifier exists.
    #[error("duplicate job identifier: {0}")]
    DuplicateJob(JobId),

    /// The record already holds a result.
    #[error("job {0} is already completed")]
    AlreadyCompleted(JobId),

    /// Storage failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobStoreError {
    /// Wraps a storage failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
