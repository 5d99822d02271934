//! Favorites store backed by a single JSON blob in `kv_store`.
//!
//! The whole `id -> Movie` mapping is read lazily on first access into an
//! in-memory working copy and written back in full after every mutation.
//! Store operations never fail: persistence errors are logged and the
//! working copy stays authoritative for the lifetime of the store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use cinepulse_api::Movie;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::connection::{open_db, open_in_memory};
use crate::kv;

/// Key holding the favorites blob.
pub const FAVORITES_KEY: &str = "favorite_movies";

/// Key receiving an undecodable blob under [`CorruptionPolicy::Quarantine`].
pub const FAVORITES_BACKUP_KEY: &str = "favorite_movies.corrupt";

/// What to do when the stored blob cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptionPolicy {
    /// Treat the store as empty. The next mutation overwrites the blob.
    #[default]
    Reset,
    /// Same as `Reset`, but first copy the blob to [`FAVORITES_BACKUP_KEY`].
    Quarantine,
}

/// Persistent set of favorite movies keyed by movie ID.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FavoritesStore {
    conn: Mutex<Connection>,
    /// Working copy, `None` until first read.
    favorites: Mutex<Option<HashMap<String, Movie>>>,
    policy: CorruptionPolicy,
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FavoritesStore {
    /// Wraps an already migrated connection.
    #[must_use]
    pub const fn new(conn: Connection, policy: CorruptionPolicy) -> Self {
        Self {
            conn: Mutex::new(conn),
            favorites: Mutex::new(None),
            policy,
        }
    }

    /// Opens the store in the database resolved from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&PathBuf>, policy: CorruptionPolicy) -> Result<Self> {
        Ok(Self::new(open_db(dir)?, policy))
    }

    /// Opens a store backed by an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub fn in_memory(policy: CorruptionPolicy) -> Result<Self> {
        Ok(Self::new(open_in_memory()?, policy))
    }

    /// Returns whether `id` is a favorite.
    pub fn is_favorite(&self, id: &str) -> bool {
        self.with_favorites(|favorites| favorites.contains_key(id))
    }

    /// Removes `movie` if it is a favorite, otherwise adds it.
    ///
    /// Returns whether the movie is a favorite afterwards. If the stored
    /// mapping cannot be read, nothing changes and `false` is returned.
    pub fn toggle_favorite(&self, movie: &Movie) -> bool {
        let mut guard = lock(&self.favorites);
        if guard.is_none() {
            *guard = self.load();
        }
        let Some(favorites) = guard.as_mut() else {
            tracing::warn!(id = %movie.id, "favorites unavailable, toggle skipped");
            return false;
        };

        let now_favorite = if favorites.remove(&movie.id).is_some() {
            false
        } else {
            favorites.insert(movie.id.clone(), movie.clone());
            true
        };

        self.persist(favorites);
        tracing::debug!(id = %movie.id, favorite = now_favorite, "favorite toggled");
        now_favorite
    }

    /// Returns every favorite movie. Order is unspecified.
    pub fn all_favorites(&self) -> Vec<Movie> {
        self.with_favorites(|favorites| favorites.values().cloned().collect())
    }

    /// Runs `f` on the working copy, loading it first if needed.
    ///
    /// A failed read is seen as empty and retried on the next access.
    fn with_favorites<R>(&self, f: impl FnOnce(&HashMap<String, Movie>) -> R) -> R {
        let mut guard = lock(&self.favorites);
        if guard.is_none() {
            *guard = self.load();
        }
        match guard.as_ref() {
            Some(favorites) => f(favorites),
            None => f(&HashMap::new()),
        }
    }

    /// Reads and decodes the stored mapping, applying the corruption policy.
    ///
    /// Returns `None` when the database could not be read.
    fn load(&self) -> Option<HashMap<String, Movie>> {
        let conn = lock(&self.conn);
        let blob = match kv::get_blob(&conn, FAVORITES_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Some(HashMap::new()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites");
                return None;
            }
        };

        match serde_json::from_slice::<HashMap<String, Movie>>(&blob) {
            Ok(favorites) => {
                tracing::debug!(count = favorites.len(), "favorites loaded");
                Some(favorites)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    policy = ?self.policy,
                    "stored favorites are corrupt, starting empty"
                );
                if self.policy == CorruptionPolicy::Quarantine {
                    if let Err(e) = kv::put_blob(&conn, FAVORITES_BACKUP_KEY, &blob) {
                        tracing::warn!(error = %e, "failed to quarantine corrupt favorites");
                    }
                }
                Some(HashMap::new())
            }
        }
    }

    /// Writes the whole mapping back. Failures are logged only.
    fn persist(&self, favorites: &HashMap<String, Movie>) {
        let blob = match serde_json::to_vec(favorites) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode favorites");
                return;
            }
        };

        let conn = lock(&self.conn);
        if let Err(e) = kv::put_blob(&conn, FAVORITES_KEY, &blob) {
            tracing::warn!(error = %e, "failed to persist favorites");
        }
    }
}
