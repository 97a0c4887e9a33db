//! SQLite-backed job database: connection, table creation, timestamp helpers.
//!
//! Job CRUD lives in `jobs`.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}?mode=rwc", out)
}

/// Handle to the SQLite-backed job database.
///
/// The default file lives under the XDG state directory:
/// `~/.local/state/telecharger/jobs.db`.
#[derive(Clone)]
pub struct JobDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl JobDb {
    /// Open (or create) the default job database.
    pub async fn open_default() -> Result<Self> {
        Self::open_at(crate::config::state_file_path("jobs.db")?).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&path_to_sqlite_uri(path))
            .await
            .with_context(|| format!("open job database {}", path.display()))?;

        let db = JobDb { pool };
        db.create_table().await?;
        tracing::debug!(path = %path.display(), "job database ready");
        Ok(db)
    }

    async fn create_table(&self) -> Result<()> {
        // Booleans are stored as 0/1 integers; audio_format and extra_args
        // may be empty strings but never NULL.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                output_name TEXT NOT NULL,
                embed_thumbnail INTEGER NOT NULL,
                audio_only INTEGER NOT NULL,
                audio_format TEXT NOT NULL DEFAULT '',
                extra_args TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<JobDb> {
    // Single connection to avoid the pool handing back a different empty DB.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = JobDb { pool };
    db.create_table().await?;
    Ok(db)
}
