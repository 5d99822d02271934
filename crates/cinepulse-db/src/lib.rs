//! Persistence layer for cinepulse.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep the user's favorite movies
//! as a single JSON blob in a small key-value table.

mod connection;
/// Favorites store.
pub mod favorites;
/// Key-value blob operations.
pub mod kv;
mod migrations;

#[allow(clippy::module_name_repetitions)]
pub use connection::{open_db, open_in_memory};
#[allow(clippy::module_name_repetitions)]
pub use favorites::{CorruptionPolicy, FAVORITES_BACKUP_KEY, FAVORITES_KEY, FavoritesStore};
