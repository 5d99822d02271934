//! `TmdbClient` - TMDB API v3 client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::types::{TmdbCredits, TmdbMovieDetails, TmdbMovieListResponse, TmdbVideos};
use crate::error::{ProviderError, ProviderResult};
use crate::fanout::best_effort_merge;
use crate::http::{DEFAULT_TIMEOUT, build_http_client, get_json, resolve_base_url};
use crate::model::{Movie, MovieDetail};
use crate::provider::LocalMovieProvider;

/// Default base URL for the TMDB API.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default prefix prepended to poster paths.
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as `api_key`.
    api_key: String,
    /// Response language (e.g. `en-US`).
    language: String,
    /// Poster URL prefix.
    image_base: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    language: Option<String>,
    image_base: Option<String>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            timeout: None,
            language: None,
            image_base: None,
        }
    }

    /// Overrides the base URL. Blank values keep the public endpoint.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key (required, may be empty).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the response language (default: `en-US`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the poster URL prefix.
    #[must_use]
    pub fn image_base(mut self, prefix: impl Into<String>) -> Self {
        self.image_base = Some(prefix.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - The base URL is invalid or `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_key = self.api_key.context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;
        let base_url = resolve_base_url(self.base_url.as_deref(), DEFAULT_BASE_URL)?;
        let http_client = build_http_client(&user_agent, self.timeout.unwrap_or(DEFAULT_TIMEOUT))?;
        let language = self
            .language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE));
        let image_base = self
            .image_base
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_IMAGE_BASE));

        Ok(TmdbClient {
            http_client,
            base_url,
            api_key,
            language,
            image_base,
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Sends a GET to `path` with `api_key`, `language` and `params`.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ProviderError::invalid_url(path, e))?;
        let mut query: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        query.extend_from_slice(params);
        get_json(&self.http_client, url, path, &query).await
    }

    /// Fetches a listing endpoint and maps every item.
    async fn list(&self, path: &str, params: &[(&str, String)]) -> ProviderResult<Vec<Movie>> {
        let response: TmdbMovieListResponse = self.get(path, params).await?;
        tracing::debug!(
            page = response.page,
            total_results = response.total_results,
            "TMDB listing received"
        );
        Ok(response
            .results
            .into_iter()
            .map(|item| item.into_movie(&self.image_base))
            .collect())
    }
}

/// Parses a TMDB movie ID.
fn parse_movie_id(id: &str) -> ProviderResult<u64> {
    id.trim()
        .parse()
        .map_err(|_| ProviderError::InvalidIdentifier(String::from(id)))
}

impl LocalMovieProvider for TmdbClient {
    #[instrument(skip_all)]
    async fn search(&self, query: &str) -> ProviderResult<Vec<Movie>> {
        let movies = self
            .list("search/movie", &[("query", String::from(query))])
            .await?;
        tracing::info!(count = movies.len(), "TMDB search completed");
        Ok(movies)
    }

    #[instrument(skip_all)]
    async fn fetch_popular(&self) -> ProviderResult<Vec<Movie>> {
        let movies = self.list("movie/popular", &[]).await?;
        tracing::info!(count = movies.len(), "TMDB popular listing completed");
        Ok(movies)
    }

    #[instrument(skip_all, fields(id = id))]
    async fn fetch_details(&self, id: &str) -> ProviderResult<MovieDetail> {
        let movie_id = parse_movie_id(id)?;
        let details_path = format!("movie/{movie_id}");
        let credits_path = format!("movie/{movie_id}/credits");
        let videos_path = format!("movie/{movie_id}/videos");

        let (details, (credits, videos)) = tokio::join!(
            self.get::<TmdbMovieDetails>(&details_path, &[]),
            best_effort_merge(
                ("credits", self.get::<TmdbCredits>(&credits_path, &[])),
                ("videos", self.get::<TmdbVideos>(&videos_path, &[])),
            ),
        );

        let details = details?;
        let trailer_url = videos.trailer_url();
        Ok(details.into_detail(&self.image_base, credits.cast_names(), trailer_url))
    }
}
