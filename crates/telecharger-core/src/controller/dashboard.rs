//! Read-only snapshot of the job partitions for the presentation layer.

use crate::error::PersistenceError;
use crate::job_db::{Job, JobStatus, JobStore};

use super::state::ActiveDownload;

/// Jobs grouped by status, re-read from the store, plus the active download.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub queued: Vec<Job>,
    pub downloading: Vec<Job>,
    pub completed: Vec<Job>,
    pub failed: Vec<Job>,
    pub active: Option<ActiveDownload>,
}

impl Dashboard {
    pub async fn load<S: JobStore>(
        store: &S,
        active: Option<ActiveDownload>,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            queued: store.list_by_status(JobStatus::Queued).await?,
            downloading: store.list_by_status(JobStatus::Downloading).await?,
            completed: store.list_by_status(JobStatus::Completed).await?,
            failed: store.list_by_status(JobStatus::Error).await?,
            active,
        })
    }

    pub fn partition(&self, status: JobStatus) -> &[Job] {
        match status {
            JobStatus::Queued => &self.queued,
            JobStatus::Downloading => &self.downloading,
            JobStatus::Completed => &self.completed,
            JobStatus::Error => &self.failed,
        }
    }

    pub fn total(&self) -> usize {
        JobStatus::ALL
            .iter()
            .map(|status| self.partition(*status).len())
            .sum()
    }

    /// Last reported percentage for `job`, if it is the active download.
    pub fn percent_for(&self, job: &Job) -> Option<f64> {
        self.active
            .as_ref()
            .filter(|active| active.job.id == job.id)
            .and_then(|active| active.percent)
    }
}

/// Fixed visual marker for statuses that need one.
pub fn status_marker(status: JobStatus) -> Option<&'static str> {
    match status {
        JobStatus::Downloading => Some("📀"),
        JobStatus::Error => Some("❌"),
        JobStatus::Queued | JobStatus::Completed => None,
    }
}

/// One-line list title: marker (if any) and output name.
pub fn job_title(job: &Job) -> String {
    match status_marker(job.status) {
        Some(marker) => format!("{} {}", marker, job.output_name),
        None => job.output_name.clone(),
    }
}

/// Detail lines shown under a selected job.
pub fn job_details(job: &Job) -> Vec<String> {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut lines = vec![
        format!("Source: {}", job.source),
        format!("Status: {}", job.status),
        format!("Audio only: {}", yes_no(job.audio_only)),
    ];
    if job.audio_only {
        let format = if job.audio_format.is_empty() {
            super::command::DEFAULT_AUDIO_FORMAT
        } else {
            job.audio_format.as_str()
        };
        lines.push(format!("Audio format: {}", format));
    }
    lines.push(format!("Embed thumbnail: {}", yes_no(job.embed_thumbnail)));
    if !job.extra_args.trim().is_empty() {
        lines.push(format!("Extra arguments: {}", job.extra_args.trim()));
    }
    lines
}
