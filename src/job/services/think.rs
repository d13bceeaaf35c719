//! Submit/poll workflow over the job store.

use crate::job::{
    domain::{JobId, JobRecord, JobStatus},
    ports::{JobStore, JobStoreError, ReplyGenerator},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Service-level errors for the submit/poll workflow.
#[derive(Debug, Clone, Error)]
pub enum ThinkServiceError {
    /// The identifier is unknown or its result was already delivered.
    #[error("job {0} not found")]
    JobNotFound(JobId),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] JobStoreError),
}

/// Result type for the submit/poll workflow.
pub type ThinkServiceResult<T> = Result<T, ThinkServiceError>;

/// Answer to a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPoll {
    /// Generation is still running.
    NotReady,
    /// The reply; the job has been removed.
    Ready(String),
}

/// A job accepted for background generation.
#[derive(Debug)]
pub struct SubmittedJob {
    id: JobId,
    worker: JoinHandle<()>,
}

impl SubmittedJob {
    /// Returns the identifier handed to the submitter.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the background task handle.
    #[must_use]
    pub fn into_worker(self) -> JoinHandle<()> {
        self.worker
    }
}

/// Accepts queries, runs generation in the background, and hands results
/// out at most once.
pub struct ThinkService<J, G, C>
where
    J: JobStore + 'static,
    G: ReplyGenerator + 'static,
    C: Clock + Send + Sync,
{
    store: Arc<J>,
    generator: Arc<G>,
    clock: Arc<C>,
}

impl<J, G, C> ThinkService<J, G, C>
where
    J: JobStore + 'static,
    G: ReplyGenerator + 'static,
    C: Clock + Send + Sync,
{
    /// Creates the service.
    #[must_use]
    pub const fn new(store: Arc<J>, generator: Arc<G>, clock: Arc<C>) -> Self {
        Self {
            store,
            generator,
            clock,
        }
    }

    /// Records a pending job and starts generating its reply.
    ///
    /// A generation failure completes the job with
    /// `Generation failed: <error>`.
    ///
    /// # Errors
    ///
    /// Returns [`ThinkServiceError::Store`] when the record cannot be
    /// created.
    pub async fn submit(
        &self,
        query: impl Into<String>,
        history: Vec<Value>,
    ) -> ThinkServiceResult<SubmittedJob> {
        let id = JobId::new();
        let record = JobRecord::pending(id, query, history, self.clock.as_ref());
        let query_text = record.query().to_owned();
        let history_items = record.history().to_vec();
        self.store.create_job(record).await?;
        info!(job_id = %id, "job submitted");

        let store = Arc::clone(&self.store);
        let generator = Arc::clone(&self.generator);
        let worker = tokio::spawn(async move {
            info!(job_id = %id, "started processing job");
            let reply = match generator.generate_reply(&query_text, &history_items).await {
                Ok(reply) => reply,
                Err(generation_error) => {
                    error!(job_id = %id, error = %generation_error, "generation failed");
                    format!("Generation failed: {generation_error}")
                }
            };
            match store.set_result(id, reply).await {
                Ok(()) => info!(job_id = %id, "completed processing job"),
                Err(store_error) => {
                    error!(job_id = %id, error = %store_error, "failed to store job result");
                }
            }
        });

        Ok(SubmittedJob { id, worker })
    }

    /// Reports a job's state, delivering and removing a completed result.
    ///
    /// # Errors
    ///
    /// Returns [`ThinkServiceError::JobNotFound`] for unknown or already
    /// delivered jobs and [`ThinkServiceError::Store`] for store failures.
    pub async fn poll(&self, id: JobId) -> ThinkServiceResult<JobPoll> {
        let record = self
            .store
            .get_job(id)
            .await?
            .ok_or(ThinkServiceError::JobNotFound(id))?;

        match record.status() {
            JobStatus::Pending => Ok(JobPoll::NotReady),
            JobStatus::Completed => {
                if !self.store.delete_job(id).await? {
                    return Err(ThinkServiceError::JobNotFound(id));
                }
                info!(job_id = %id, "job result delivered");
                Ok(JobPoll::Ready(record.result().unwrap_or_default().to_owned()))
            }
        }
    }
}
