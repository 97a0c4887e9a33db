//! Error kinds raised by the job store and the downloader process runner.
//!
//! Both are recovered at the controller boundary; neither ends the session.

use thiserror::Error;

use crate::job_db::JobId;

/// A store operation failed (missing row, empty required field, SQLite or disk I/O).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// The external downloader could not be launched (not found, permission denied).
#[derive(Debug, Error)]
#[error("could not launch `{program}`: {source}")]
pub struct SpawnError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

impl SpawnError {
    pub fn new(program: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            program: program.into(),
            source,
        }
    }
}
