//! `telecharger remove <id>` – remove a queued job.

use anyhow::{bail, Result};
use telecharger_core::job_db::{JobDb, JobId, JobStatus};

/// Only queued jobs can be removed; anything else is reported, not deleted.
pub async fn run_remove(db: &JobDb, id: JobId) -> Result<()> {
    let Some(job) = db.get_job(id).await? else {
        bail!("no job with id {id}");
    };
    if job.status != JobStatus::Queued {
        bail!("job {id} is {}; only queued jobs can be removed", job.status);
    }
    db.remove_job(id).await?;
    println!("Removed job {id}");
    Ok(())
}
