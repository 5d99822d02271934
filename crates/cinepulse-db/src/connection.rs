//! Database connection management.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name.
const DB_FILE_NAME: &str = "cinepulse.db";

/// Opens (or creates) the database and runs migrations.
///
/// The file lives at `{dir}/cinepulse.db`, else under `$XDG_DATA_HOME`,
/// else under `~/.local/share`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let db_path = resolve_db_path(dir)?;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    run_migrations(&conn).context("database migration failed")?;
    tracing::debug!(path = %db_path.display(), "database opened");

    Ok(conn)
}

/// Opens a migrated in-memory database.
///
/// # Errors
///
/// Returns an error if migrations fail.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    run_migrations(&conn).context("database migration failed")?;
    Ok(conn)
}

/// Resolves the database file path.
fn resolve_db_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    db_path_from(dir, |name| std::env::var(name).ok())
}

/// Resolves the database path using `env` for variable lookups.
fn db_path_from(dir: Option<&PathBuf>, env: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(DB_FILE_NAME));
    }

    let data_home = env("XDG_DATA_HOME")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute());
    let base = match data_home {
        Some(base) => base,
        None => env("HOME")
            .map(|home| PathBuf::from(home).join(".local").join("share"))
            .context("neither XDG_DATA_HOME nor HOME is set")?,
    };
    Ok(base.join("cinepulse").join(DB_FILE_NAME))
}
