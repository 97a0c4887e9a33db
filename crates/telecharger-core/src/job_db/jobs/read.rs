//! Job read operations: partitions by status, full listing, single lookup.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::PersistenceError;

use super::super::db::JobDb;
use super::super::types::{Job, JobId, JobStatus};

fn job_from_row(row: &SqliteRow) -> Result<Job, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(Job {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        output_name: row.try_get("output_name")?,
        audio_only: row.try_get("audio_only")?,
        audio_format: row.try_get("audio_format")?,
        embed_thumbnail: row.try_get("embed_thumbnail")?,
        extra_args: row.try_get("extra_args")?,
        status: JobStatus::from_db(&status),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl JobDb {
    /// All jobs with the given status, oldest first (ascending id).
    pub async fn jobs_with_status(&self, status: JobStatus) -> Result<Vec<Job>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT id, source, output_name, audio_only, audio_format,
                   embed_thumbnail, extra_args, status, created_at, updated_at
            FROM jobs
            WHERE status = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(job_from_row(&row)?);
        }
        Ok(out)
    }

    /// Every job in the database, oldest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT id, source, output_name, audio_only, audio_format,
                   embed_thumbnail, extra_args, status, created_at, updated_at
            FROM jobs
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(job_from_row(&row)?);
        }
        Ok(out)
    }

    /// Fetch a single job row.
    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT id, source, output_name, audio_only, audio_format,
                   embed_thumbnail, extra_args, status, created_at, updated_at
            FROM jobs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(job_from_row(&row)?))
    }
}
