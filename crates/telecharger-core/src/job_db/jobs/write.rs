//! Job write operations: add, status, remove, recovery.

use crate::error::PersistenceError;

use super::super::db::{unix_timestamp, JobDb};
use super::super::types::{JobId, JobStatus, NewJob};

impl JobDb {
    /// Insert a new job in `queued` status.
    ///
    /// Source and output name are required; whitespace-only counts as empty.
    pub async fn add_job(&self, job: &NewJob) -> Result<JobId, PersistenceError> {
        if job.source.trim().is_empty() {
            return Err(PersistenceError::EmptyField("source"));
        }
        if job.output_name.trim().is_empty() {
            return Err(PersistenceError::EmptyField("output_name"));
        }

        let now = unix_timestamp();
        let row_id = sqlx::query(
            r#"
            INSERT INTO jobs (
                source, output_name, embed_thumbnail, audio_only,
                audio_format, extra_args, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&job.source)
        .bind(&job.output_name)
        .bind(job.embed_thumbnail)
        .bind(job.audio_only)
        .bind(&job.audio_format)
        .bind(&job.extra_args)
        .bind(JobStatus::Queued.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    /// Update the status of an existing job. Setting the current status again is a no-op.
    pub async fn update_status(&self, id: JobId, status: JobStatus) -> Result<(), PersistenceError> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if r.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }

    /// Normalize every job left in `downloading` back to `queued`.
    /// Returns the number of jobs reset.
    pub async fn recover_downloading_jobs(&self) -> Result<u64, PersistenceError> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'queued',
                updated_at = ?1
            WHERE status = 'downloading'
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }

    /// Permanently remove a job row.
    ///
    /// Status checks and file cleanup are handled by higher layers.
    pub async fn remove_job(&self, id: JobId) -> Result<(), PersistenceError> {
        let r = sqlx::query(
            r#"
            DELETE FROM jobs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if r.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }
}
