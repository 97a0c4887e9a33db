//! Removal of partial-download artifacts left by an aborted downloader.

use std::io;
use std::path::{Path, PathBuf};

/// Suffix the downloader gives files it is still writing.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Delete every regular file in `dir` whose name ends in `.part`.
///
/// A missing directory counts as clean. Individual removal failures are
/// logged and skipped; the removed paths are returned.
pub async fn remove_partial_artifacts(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut removed = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let is_partial = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX));
        if !is_partial || !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed partial download");
                removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "could not remove partial download: {}", e),
        }
    }
    Ok(removed)
}
