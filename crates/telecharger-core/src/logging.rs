//! Logging init: file under the XDG state dir when enabled, otherwise stderr.
//!
//! The interactive session shares the terminal with stderr, so the stderr
//! subscriber only lets warnings through unless `RUST_LOG` says otherwise.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

const FILE_FILTER: &str = "info,telecharger_core=debug,telecharger_cli=debug";
const STDERR_FILTER: &str = "warn";

/// `~/.local/state/telecharger/telecharger.log`
pub fn log_file_path() -> Result<PathBuf> {
    crate::config::state_file_path("telecharger.log")
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. With `enabled`, logs are appended to
/// [`log_file_path`]; otherwise warnings go to stderr.
/// Returns Err if the log file cannot be opened so the caller can fall back.
pub fn init_logging(enabled: bool) -> Result<()> {
    if !enabled {
        init_logging_stderr();
        return Ok(());
    }

    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(FILE_FILTER))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install log subscriber: {e}"))?;

    tracing::info!("telecharger logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only subscriber. A no-op if one is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(STDERR_FILTER))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

