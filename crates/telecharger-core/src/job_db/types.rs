//! Types used by the job database.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job identifier.
pub type JobId = i64;

/// Lifecycle status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Downloading,
    Completed,
    Error,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Queued,
        JobStatus::Downloading,
        JobStatus::Completed,
        JobStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    /// Decode a stored status. Unknown strings are treated as `Error` so a
    /// corrupt row never re-enters the queue.
    pub(crate) fn from_db(s: &str) -> Self {
        s.parse().unwrap_or(JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "downloading" => Ok(JobStatus::Downloading),
            "completed" => Ok(JobStatus::Completed),
            "error" => Ok(JobStatus::Error),
            other => Err(format!(
                "unknown status `{other}` (expected queued, downloading, completed or error)"
            )),
        }
    }
}

/// Fields supplied by a create intent. Status and id are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    /// Remote resource: a URL or a site content id.
    pub source: String,
    /// Base name for the resulting file(s), without extension.
    pub output_name: String,
    pub audio_only: bool,
    /// Only meaningful with `audio_only`; empty means the tool default.
    pub audio_format: String,
    pub embed_thumbnail: bool,
    /// Free-form downloader arguments, split on whitespace when the command is built.
    pub extra_args: String,
}

/// Full job record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub source: String,
    pub output_name: String,
    pub audio_only: bool,
    pub audio_format: String,
    pub embed_thumbnail: bool,
    pub extra_args: String,
    pub status: JobStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
