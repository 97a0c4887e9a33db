use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration loaded from `~/.config/telecharger/config.toml`.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelechargerConfig {
    /// Write debug logs to the XDG state directory instead of warnings to stderr.
    pub enable_logging: bool,
    /// Where finished (and in-progress `.part`) files are written.
    pub download_folder: PathBuf,
    /// Downloader executable, looked up on `PATH` unless absolute.
    pub downloader: String,
    /// Job database location; the XDG state directory when unset.
    pub database_path: Option<PathBuf>,
}

impl Default for TelechargerConfig {
    fn default() -> Self {
        Self {
            enable_logging: false,
            download_folder: PathBuf::from("."),
            downloader: "yt-dlp".to_string(),
            database_path: None,
        }
    }
}

/// Existing config file, if any. Nothing is created.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("telecharger")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// `<XDG state home>/telecharger/<name>`. The parent dir is not created.
pub fn state_file_path(name: &str) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::new()?;
    Ok(state_file_under(&xdg_dirs.get_state_home(), name))
}

fn state_file_under(state_home: &Path, name: &str) -> PathBuf {
    state_home.join("telecharger").join(name)
}

/// Load configuration from disk, falling back to defaults when no file exists.
pub fn load() -> Result<TelechargerConfig> {
    match config_path()? {
        Some(path) => load_from(&path),
        None => Ok(TelechargerConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<TelechargerConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: TelechargerConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
