//! `MovieProvider` trait and the configuration-selected [`Provider`].
#![allow(clippy::future_not_send)]

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;
use crate::http::DEFAULT_TIMEOUT;
use crate::model::{Movie, MovieDetail};
use crate::omdb::OmdbClient;
use crate::tmdb::TmdbClient;

/// Movie data provider trait.
///
/// Abstracts the upstream API for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieProvider: Send)]
pub trait LocalMovieProvider {
    /// Searches movies by free text.
    ///
    /// A query that matches nothing yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a network or decode error.
    async fn search(&self, query: &str) -> ProviderResult<Vec<Movie>>;

    /// Fetches the popular listing.
    ///
    /// # Errors
    ///
    /// Returns a network or decode error.
    async fn fetch_popular(&self) -> ProviderResult<Vec<Movie>>;

    /// Fetches one fully populated record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` for a malformed `id`, otherwise a
    /// network or decode error.
    async fn fetch_details(&self, id: &str) -> ProviderResult<MovieDetail>;
}

/// Which upstream API to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OMDb (search, then hydrate each hit).
    Omdb,
    /// TMDB v3.
    #[default]
    Tmdb,
}

/// Settings used to build a [`Provider`].
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Selected upstream.
    pub kind: ProviderKind,
    /// Base URL override; `None` or blank keeps the public endpoint.
    pub base_url: Option<String>,
    /// API key.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Response language (TMDB only).
    pub language: Option<String>,
    /// Seed query for the popular listing (OMDb only).
    pub popular_query: Option<String>,
    /// User-Agent header.
    pub user_agent: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            language: None,
            popular_query: None,
            user_agent: format!("cinepulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Exactly one configured provider.
#[derive(Debug)]
pub enum Provider {
    /// OMDb client.
    Omdb(OmdbClient),
    /// TMDB client.
    Tmdb(TmdbClient),
}

impl Provider {
    /// Builds the provider selected by `settings.kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let base_url = settings.base_url.clone().unwrap_or_default();
        let provider = match settings.kind {
            ProviderKind::Omdb => {
                let mut builder = OmdbClient::builder()
                    .base_url(base_url)
                    .api_key(settings.api_key.clone())
                    .user_agent(settings.user_agent.clone())
                    .timeout(settings.timeout);
                if let Some(ref query) = settings.popular_query {
                    builder = builder.popular_query(query.clone());
                }
                Self::Omdb(builder.build()?)
            }
            ProviderKind::Tmdb => {
                let mut builder = TmdbClient::builder()
                    .base_url(base_url)
                    .api_key(settings.api_key.clone())
                    .user_agent(settings.user_agent.clone())
                    .timeout(settings.timeout);
                if let Some(ref language) = settings.language {
                    builder = builder.language(language.clone());
                }
                Self::Tmdb(builder.build()?)
            }
        };
        tracing::debug!(kind = ?settings.kind, "provider built");
        Ok(provider)
    }

    /// Returns the selected kind.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Omdb(_) => ProviderKind::Omdb,
            Self::Tmdb(_) => ProviderKind::Tmdb,
        }
    }
}

impl LocalMovieProvider for Provider {
    async fn search(&self, query: &str) -> ProviderResult<Vec<Movie>> {
        match self {
            Self::Omdb(client) => client.search(query).await,
            Self::Tmdb(client) => client.search(query).await,
        }
    }

    async fn fetch_popular(&self) -> ProviderResult<Vec<Movie>> {
        match self {
            Self::Omdb(client) => client.fetch_popular().await,
            Self::Tmdb(client) => client.fetch_popular().await,
        }
    }

    async fn fetch_details(&self, id: &str) -> ProviderResult<MovieDetail> {
        match self {
            Self::Omdb(client) => client.fetch_details(id).await,
            Self::Tmdb(client) => client.fetch_details(id).await,
        }
    }
}

/// Title shown above a listing.
pub const POPULAR_TITLE: &str = "Popular Movies";

/// Loads the home listing for a user-entered query.
///
/// The query is trimmed; a blank query falls back to the popular listing.
/// Returns the listing title together with the movies.
///
/// # Errors
///
/// Propagates the provider error.
pub async fn load_listing<P: LocalMovieProvider>(
    provider: &P,
    query: &str,
) -> ProviderResult<(String, Vec<Movie>)> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        let movies = provider.fetch_popular().await?;
        return Ok((String::from(POPULAR_TITLE), movies));
    }
    let movies = provider.search(trimmed).await?;
    Ok((format!("Results for \"{trimmed}\""), movies))
}
