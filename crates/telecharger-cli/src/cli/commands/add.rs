//! `telecharger add <source> -o <name>` – queue a new download job.

use anyhow::Result;
use telecharger_core::job_db::{JobDb, NewJob};

pub async fn run_add(db: &JobDb, job: &NewJob) -> Result<()> {
    let id = db.add_job(job).await?;
    println!("Added job {id} for {}", job.source);
    Ok(())
}
