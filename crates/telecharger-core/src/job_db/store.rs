//! The narrow store interface the controller depends on.

use crate::error::PersistenceError;

use super::db::JobDb;
use super::types::{Job, JobId, JobStatus, NewJob};

/// Key-indexed job table as seen by the queue controller.
///
/// Every operation is atomic from the caller's point of view.
#[allow(async_fn_in_trait)]
pub trait JobStore {
    /// Insert a job with status `queued`.
    async fn create(&self, job: &NewJob) -> Result<JobId, PersistenceError>;

    /// Jobs with `status`, in creation order. Empty when none match.
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, PersistenceError>;

    /// Fails with `NotFound` for an unknown id; idempotent otherwise.
    async fn set_status(&self, id: JobId, status: JobStatus) -> Result<(), PersistenceError>;

    /// Fails with `NotFound` for an unknown id.
    async fn delete(&self, id: JobId) -> Result<(), PersistenceError>;

    /// Move every `downloading` job back to `queued`; returns how many moved.
    async fn reset_downloading(&self) -> Result<u64, PersistenceError>;
}

impl JobStore for JobDb {
    async fn create(&self, job: &NewJob) -> Result<JobId, PersistenceError> {
        self.add_job(job).await
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, PersistenceError> {
        self.jobs_with_status(status).await
    }

    async fn set_status(&self, id: JobId, status: JobStatus) -> Result<(), PersistenceError> {
        self.update_status(id, status).await
    }

    async fn delete(&self, id: JobId) -> Result<(), PersistenceError> {
        self.remove_job(id).await
    }

    async fn reset_downloading(&self) -> Result<u64, PersistenceError> {
        self.recover_downloading_jobs().await
    }
}
