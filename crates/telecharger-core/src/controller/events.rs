//! Messages into and out of the controller.

use crate::job_db::{Job, JobId, NewJob};
use crate::process::ExitOutcome;
use crate::progress::ProgressUpdate;

/// Sent by the output-pumping task back to the event loop.
///
/// For one job, every `Progress` is sent before its `Finished`.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress { job_id: JobId, update: ProgressUpdate },
    Finished { job_id: JobId, outcome: ExitOutcome },
}

/// State-change notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Controller state or store contents changed; re-read the dashboard.
    StateChanged,
    Progress { job_id: JobId, percent: f64 },
    Completed(Job),
    Failed { job: Job, reason: String },
    /// A store operation failed; the view should keep its current state.
    Message(String),
}

/// User intents forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Create(NewJob),
    Download(JobId),
    /// `None` when nothing is selected.
    Delete(Option<JobId>),
    Quit,
    Left,
    Right,
    Confirm,
}

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}
