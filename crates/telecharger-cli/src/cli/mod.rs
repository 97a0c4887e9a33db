//! CLI for the telecharger download queue.

mod commands;

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use telecharger_core::config::{self, TelechargerConfig};
use telecharger_core::job_db::{JobDb, JobId, JobStatus, NewJob};
use telecharger_core::logging;

use commands::{run_add, run_completions, run_list, run_remove, run_session};

/// Database used instead of the configured one when `DEBUG` is set.
pub const DEBUG_DATABASE: &str = "./sqlite-database-dev.db";

/// Top-level CLI for telecharger.
#[derive(Debug, Parser)]
#[command(name = "telecharger")]
#[command(about = "telecharger: single-flight download queue around yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Queue a new download job.
    Add {
        /// URL or content id handed to the downloader.
        source: String,

        /// Output file name, without extension.
        #[arg(short, long)]
        output: String,

        /// Extract audio only.
        #[arg(long)]
        audio_only: bool,

        /// Audio format used with --audio-only (downloader default: m4a).
        #[arg(long, value_name = "FORMAT", default_value = "")]
        audio_format: String,

        /// Embed the thumbnail in the output file.
        #[arg(long)]
        embed_thumbnail: bool,

        /// Extra downloader arguments, split on whitespace.
        #[arg(long, value_name = "ARGS", default_value = "", allow_hyphen_values = true)]
        extra_args: String,
    },

    /// List jobs, optionally only those with one status.
    List {
        /// queued, downloading, completed or error.
        #[arg(long)]
        status: Option<JobStatus>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Remove a queued job by its ID.
    Remove {
        /// Job identifier.
        id: JobId,
    },

    /// Interactive session: start downloads, watch progress, quit safely.
    Session,

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell);
        }

        let cfg = config::load()?;
        if let Err(e) = logging::init_logging(cfg.enable_logging) {
            eprintln!("telecharger: log file unavailable ({:#}); logging to stderr", e);
            logging::init_logging_stderr();
        }
        tracing::debug!("loaded config: {:?}", cfg);

        let db = open_database(&cfg).await?;

        match cli.command {
            CliCommand::Add {
                source,
                output,
                audio_only,
                audio_format,
                embed_thumbnail,
                extra_args,
            } => {
                let job = NewJob {
                    source,
                    output_name: output,
                    audio_only,
                    audio_format,
                    embed_thumbnail,
                    extra_args,
                };
                run_add(&db, &job).await?;
            }
            CliCommand::List { status, json } => run_list(&db, status, json).await?,
            CliCommand::Remove { id } => run_remove(&db, id).await?,
            CliCommand::Session => run_session(db, &cfg).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

/// `DEBUG` (non-empty) wins, then the configured path; `None` means the XDG default.
pub(crate) fn database_path(cfg: &TelechargerConfig, debug: Option<&OsStr>) -> Option<PathBuf> {
    if debug.is_some_and(|v| !v.is_empty()) {
        return Some(PathBuf::from(DEBUG_DATABASE));
    }
    cfg.database_path.clone()
}

async fn open_database(cfg: &TelechargerConfig) -> Result<JobDb> {
    let debug = std::env::var_os("DEBUG");
    match database_path(cfg, debug.as_deref()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "opening job database");
            JobDb::open_at(path).await
        }
        None => JobDb::open_default().await,
    }
}

#[cfg(test)]
mod tests;
