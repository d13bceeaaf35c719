//! In-memory job store.

use crate::job::{
    domain::{JobId, JobRecord},
    ports::{JobStore, JobStoreError, JobStoreResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local job store guarded by a single lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<Mutex<HashMap<JobId, JobRecord>>>,
}

impl InMemoryJobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> JobStoreResult<MutexGuard<'_, HashMap<JobId, JobRecord>>> {
        self.jobs
            .lock()
            .map_err(|err| JobStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create_job(&self, record: JobRecord) -> JobStoreResult<()> {
        let mut jobs = self.lock()?;
        if jobs.contains_key(&record.id()) {
            return Err(JobStoreError::DuplicateJob(record.id()));
        }
        jobs.insert(record.id(), record);
        Ok(())
    }

    async fn set_result(&self, id: JobId, result: String) -> JobStoreResult<()> {
        let mut jobs = self.lock()?;
        let Some(record) = jobs.get_mut(&id) else {
            return Ok(());
        };
        record
            .complete(result)
            .map_err(|_| JobStoreError::AlreadyCompleted(id))
    }

    async fn get_job(&self, id: JobId) -> JobStoreResult<Option<JobRecord>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn delete_job(&self, id: JobId) -> JobStoreResult<bool> {
        Ok(self.lock()?.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::domain::JobStatus;
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryJobStore {
        InMemoryJobStore::new()
    }

    fn pending(id: JobId) -> JobRecord {
        JobRecord::pending(id, "capital of France", Vec::new(), &DefaultClock)
    }

    #[rstest]
    #[tokio::test]
    async fn record_moves_from_pending_to_completed_to_gone(store: InMemoryJobStore) {
        let id = JobId::new();
        store.create_job(pending(id)).await.expect("create");

        let created = store.get_job(id).await.expect("get").expect("present");
        assert_eq!(created.status(), JobStatus::Pending);

        store
            .set_result(id, "Paris".to_owned())
            .await
            .expect("set result");
        let completed = store.get_job(id).await.expect("get").expect("present");
        assert_eq!(completed.status(), JobStatus::Completed);
        assert_eq!(completed.result(), Some("Paris"));

        assert!(store.delete_job(id).await.expect("delete"));
        assert!(store.get_job(id).await.expect("get").is_none());
        assert!(!store.delete_job(id).await.expect("delete is idempotent"));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_identifier_is_rejected(store: InMemoryJobStore) {
        let id = JobId::new();
        store.create_job(pending(id)).await.expect("create");

        let result = store.create_job(pending(id)).await;

        assert!(matches!(result, Err(JobStoreError::DuplicateJob(dup)) if dup == id));
    }

    #[rstest]
    #[tokio::test]
    async fn result_for_unknown_job_is_ignored(store: InMemoryJobStore) {
        store
            .set_result(JobId::new(), "late".to_owned())
            .await
            .expect("no-op");
    }

    #[rstest]
    #[tokio::test]
    async fn second_result_is_rejected(store: InMemoryJobStore) {
        let id = JobId::new();
        store.create_job(pending(id)).await.expect("create");
        store
            .set_result(id, "first".to_owned())
            .await
            .expect("first result");

        let second = store.set_result(id, "second".to_owned()).await;

        assert!(matches!(second, Err(JobStoreError::AlreadyCompleted(_))));
        let record = store.get_job(id).await.expect("get").expect("present");
        assert_eq!(record.result(), Some("first"));
    }
}
