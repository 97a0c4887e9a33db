//! `telecharger list` – show jobs, optionally filtered by status.

use anyhow::{Context, Result};
use telecharger_core::controller::status_marker;
use telecharger_core::job_db::{JobDb, JobStatus};

pub async fn run_list(db: &JobDb, status: Option<JobStatus>, json: bool) -> Result<()> {
    let jobs = match status {
        Some(status) => db.jobs_with_status(status).await?,
        None => db.list_jobs().await?,
    };

    if json {
        let out = serde_json::to_string_pretty(&jobs).context("serialize jobs")?;
        println!("{out}");
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No jobs in database.");
        return Ok(());
    }
    println!("{:<6} {:<12} {:<24} {}", "ID", "STATUS", "OUTPUT", "SOURCE");
    for j in jobs {
        let status = match status_marker(j.status) {
            Some(marker) => format!("{} {}", j.status, marker),
            None => j.status.to_string(),
        };
        println!("{:<6} {:<12} {:<24} {}", j.id, status, j.output_name, j.source);
    }
    Ok(())
}
