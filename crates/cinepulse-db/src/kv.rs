//! Key-value blob CRUD operations on `kv_store`.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

/// Loads the blob stored under `key`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_blob(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        rusqlite::params![key],
        |row| {
            // Accept TEXT as well as BLOB values.
            row.get_ref(0)?.as_bytes().map(<[u8]>::to_vec).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
            })
        },
    )
    .optional()
    .with_context(|| format!("failed to read key {key}"))
}

/// Inserts or replaces the blob stored under `key`.
///
/// The write is a single upsert inside a transaction, so the previous
/// value stays intact if it fails.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn put_blob(conn: &Connection, key: &str, value: &[u8]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;

    tx.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value],
    )
    .with_context(|| format!("failed to write key {key}"))?;

    tx.commit()
        .with_context(|| format!("failed to commit key {key}"))?;
    Ok(())
}
