//! `OmdbClient` - OMDb API client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::types::{OmdbMovieDetail, OmdbSearchResponse};
use crate::error::{ProviderError, ProviderResult};
use crate::fanout::collect_all_successes;
use crate::http::{DEFAULT_TIMEOUT, build_http_client, get_json, resolve_base_url};
use crate::model::{Movie, MovieDetail};
use crate::provider::LocalMovieProvider;

/// Default base URL for the OMDb API.
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Default seed query used for the popular listing.
pub const DEFAULT_POPULAR_QUERY: &str = "movie";

/// Maximum number of search hits hydrated with a detail fetch.
pub const MAX_HYDRATE: usize = 20;

/// OMDb API client.
///
/// Search hits carry neither runtime nor rating, so every hit is hydrated
/// with its own detail request.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as `apikey`.
    api_key: String,
    /// Seed query for `fetch_popular`.
    popular_query: String,
}

/// Builder for `OmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    popular_query: Option<String>,
}

impl OmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            timeout: None,
            popular_query: None,
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

    /// Sets the seed query for the popular listing (default: `"movie"`).
    #[must_use]
    pub fn popular_query(mut self, query: impl Into<String>) -> Self {
        self.popular_query = Some(query.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - The base URL is invalid or `reqwest::Client` build fails.
    pub fn build(self) -> Result<OmdbClient> {
        let api_key = self.api_key.context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;
        let base_url = resolve_base_url(self.base_url.as_deref(), DEFAULT_BASE_URL)?;
        let http_client = build_http_client(&user_agent, self.timeout.unwrap_or(DEFAULT_TIMEOUT))?;
        let popular_query = self
            .popular_query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_POPULAR_QUERY));

        Ok(OmdbClient {
            http_client,
            base_url,
            api_key,
            popular_query,
        })
    }
}

impl OmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OmdbClientBuilder {
        OmdbClientBuilder::new()
    }

    /// Sends a GET to the base URL with `apikey` plus `params`.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        let mut query: Vec<(&str, String)> = vec![("apikey", self.api_key.clone())];
        query.extend_from_slice(params);
        get_json(&self.http_client, self.base_url.clone(), endpoint, &query).await
    }

    /// Fetches one raw detail record by IMDb ID.
    ///
    /// OMDb reports a bad ID as `Response: "False"` with HTTP 200; its
    /// `Error` text becomes the decode failure message.
    async fn detail_record(&self, imdb_id: &str) -> ProviderResult<OmdbMovieDetail> {
        validate_imdb_id(imdb_id)?;
        let value: serde_json::Value = self.get("detail", &[("i", String::from(imdb_id))]).await?;
        decode_detail(value)
    }
}

/// Decodes a detail body, surfacing OMDb's own error message when present.
fn decode_detail(value: serde_json::Value) -> ProviderResult<OmdbMovieDetail> {
    let decode_failure = |source| ProviderError::DecodeFailure {
        endpoint: String::from("detail"),
        source,
    };

    if value.get("Response").and_then(serde_json::Value::as_str) == Some("False") {
        let message = value
            .get("Error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("OMDb reported no result");
        return Err(decode_failure(<serde_json::Error as serde::de::Error>::custom(
            message,
        )));
    }

    serde_json::from_value(value).map_err(decode_failure)
}

/// Rejects identifiers that cannot be a valid OMDb `i` parameter.
fn validate_imdb_id(id: &str) -> ProviderResult<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ProviderError::InvalidIdentifier(String::from(id)));
    }
    Ok(())
}

impl LocalMovieProvider for OmdbClient {
    #[instrument(skip_all)]
    async fn search(&self, query: &str) -> ProviderResult<Vec<Movie>> {
        let response: OmdbSearchResponse = self.get("search", &[("s", String::from(query))]).await?;
        if let Some(ref error) = response.error {
            tracing::debug!(error = %error, "OMDb search reported no results");
        }

        let mut summaries = response.into_summaries();
        if summaries.is_empty() {
            return Ok(Vec::new());
        }
        summaries.truncate(MAX_HYDRATE);

        let hydrations: Vec<_> = summaries
            .iter()
            .map(|summary| async move {
                self.detail_record(&summary.imdb_id)
                    .await
                    .map(OmdbMovieDetail::into_movie)
            })
            .collect();

        let movies = collect_all_successes(hydrations, MAX_HYDRATE).await?;

        tracing::info!(
            hits = summaries.len(),
            hydrated = movies.len(),
            "OMDb search completed"
        );
        Ok(movies)
    }

    #[instrument(skip_all)]
    async fn fetch_popular(&self) -> ProviderResult<Vec<Movie>> {
        self.search(&self.popular_query).await
    }

    #[instrument(skip_all)]
    async fn fetch_details(&self, id: &str) -> ProviderResult<MovieDetail> {
        let record = self.detail_record(id).await?;
        Ok(record.into_detail())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]

    use super::*;

    const SEARCH_BODY: &str = include_str!("../../../../fixtures/omdb/search_batman.json");
    const DETAIL_BODY: &str = include_str!("../../../../fixtures/omdb/detail_tt0372784.json");

    fn client_for(server: &wiremock::MockServer) -> OmdbClient {
        OmdbClient::builder()
            .base_url(format!("{}/", server.uri()))
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    fn detail_json(id: &str, title: &str) -> String {
        format!(
            r#"{{"Title":"{title}","Year":"2005","imdbID":"{id}","Poster":"N/A","Runtime":"120 min","imdbRating":"7.0"}}"#
        )
    }

    async fn mount_search(server: &wiremock::MockServer, query: &str, body: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("s", query))
            .and(wiremock::matchers::query_param("apikey", "test-key"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mount_detail(server: &wiremock::MockServer, id: &str, status: u16, body: String) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("i", id))
            .respond_with(wiremock::ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn search_json(ids: &[&str]) -> String {
        let hits: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(r#"{{"Title":"Movie {id}","Year":"2005","imdbID":"{id}","Type":"movie","Poster":"N/A"}}"#)
            })
            .collect();
        format!(
            r#"{{"Search":[{}],"totalResults":"{}","Response":"True"}}"#,
            hits.join(","),
            ids.len()
        )
    }

    #[test]
    fn test_builder_requires_api_key() {
        // Arrange & Act
        let result = OmdbClient::builder().user_agent("test/0.0.0").build();

        // Assert
        assert!(result.unwrap_err().to_string().contains("api_key is required"));
    }

    #[test]
    fn test_builder_defaults() {
        // Arrange & Act
        let client = OmdbClient::builder()
            .api_key("")
            .base_url("   ")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.popular_query, DEFAULT_POPULAR_QUERY);
    }

    #[test]
    fn test_validate_imdb_id() {
        assert!(validate_imdb_id("tt0372784").is_ok());
        assert!(matches!(
            validate_imdb_id(""),
            Err(ProviderError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            validate_imdb_id("tt 123&x=1"),
            Err(ProviderError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_search_hydrates_every_hit() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        mount_search(&server, "batman", SEARCH_BODY).await;
        mount_detail(&server, "tt0372784", 200, String::from(DETAIL_BODY)).await;
        mount_detail(&server, "tt0468569", 200, detail_json("tt0468569", "The Dark Knight")).await;
        mount_detail(&server, "tt1345836", 200, detail_json("tt1345836", "The Dark Knight Rises")).await;
        let client = client_for(&server);

        // Act
        let mut movies = client.search("batman").await.unwrap();

        // Assert
        movies.sort_by(|a, b| a.id.cmp(&b.id));
        let ids: Vec<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["tt0372784", "tt0468569", "tt1345836"]);
        let begins = movies.first().unwrap();
        assert_eq!(begins.duration, "140");
        assert_eq!(begins.rating, 8.2);
    }

    #[tokio::test]
    async fn test_search_partial_failure_returns_successes() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        let ids = ["tt0000001", "tt0000002", "tt0000003", "tt0000004", "tt0000005"];
        mount_search(&server, "five", &search_json(&ids)).await;
        mount_detail(&server, "tt0000001", 200, detail_json("tt0000001", "One")).await;
        mount_detail(&server, "tt0000002", 500, String::from("oops")).await;
        mount_detail(&server, "tt0000003", 200, detail_json("tt0000003", "Three")).await;
        mount_detail(&server, "tt0000004", 200, String::from("{not json")).await;
        mount_detail(&server, "tt0000005", 200, detail_json("tt0000005", "Five")).await;
        let client = client_for(&server);

        // Act
        let movies = client.search("five").await.unwrap();

        // Assert
        assert_eq!(movies.len(), 3);
    }

    #[tokio::test]
    async fn test_search_all_hydrations_fail() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        let ids = ["tt0000001", "tt0000002"];
        mount_search(&server, "broken", &search_json(&ids)).await;
        mount_detail(&server, "tt0000001", 503, String::from("down")).await;
        mount_detail(&server, "tt0000002", 503, String::from("down")).await;
        let client = client_for(&server);

        // Act
        let result = client.search("broken").await;

        // Assert
        assert!(matches!(result, Err(ProviderError::NetworkFailure { .. })));
    }

    #[tokio::test]
    async fn test_search_caps_hydration_at_twenty() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        let ids: Vec<String> = (1..=25).map(|i| format!("tt{i:07}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        mount_search(&server, "many", &search_json(&id_refs)).await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param_is_missing("s"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(detail_json("tt0000001", "Any")),
            )
            .expect(20)
            .mount(&server)
            .await;
        let client = client_for(&server);

        // Act
        let movies = client.search("many").await.unwrap();

        // Assert
        assert_eq!(movies.len(), MAX_HYDRATE);
    }

    #[tokio::test]
    async fn test_search_not_found_is_empty_success() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        let body = include_str!("../../../../fixtures/omdb/search_not_found.json");
        mount_search(&server, "zzzzqqq", body).await;
        let client = client_for(&server);

        // Act
        let movies = client.search("zzzzqqq").await.unwrap();

        // Assert
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_popular_uses_seed_query() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        mount_search(&server, "classics", &search_json(&["tt0000001"])).await;
        mount_detail(&server, "tt0000001", 200, detail_json("tt0000001", "One")).await;
        let client = OmdbClient::builder()
            .base_url(format!("{}/", server.uri()))
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .popular_query("classics")
            .build()
            .unwrap();

        // Act
        let movies = client.fetch_popular().await.unwrap();

        // Assert
        assert_eq!(movies.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_details_via_http() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        mount_detail(&server, "tt0372784", 200, String::from(DETAIL_BODY)).await;
        let client = client_for(&server);

        // Act
        let detail = client.fetch_details("tt0372784").await.unwrap();

        // Assert
        assert_eq!(detail.title, "Batman Begins");
        assert_eq!(detail.genres.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_details_reports_upstream_error() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        mount_detail(
            &server,
            "tt9999999",
            200,
            String::from(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#),
        )
        .await;
        let client = client_for(&server);

        // Act
        let err = client.fetch_details("tt9999999").await.unwrap_err();

        // Assert
        assert!(matches!(err, ProviderError::DecodeFailure { .. }));
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(cause, "Incorrect IMDb ID.");
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_leak_api_key() {
        // Arrange: nothing listens on port 1
        let client = OmdbClient::builder()
            .base_url("http://127.0.0.1:1/")
            .api_key("secret-key")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let err = client.fetch_details("tt0372784").await.unwrap_err();

        // Assert
        let mut text = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(e) = source {
            text.push_str(&e.to_string());
            source = e.source();
        }
        assert!(!text.is_empty());
        assert!(!text.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_fetch_details_invalid_id_issues_no_request() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = client_for(&server);

        // Act
        let result = client.fetch_details("tt 0372784").await;

        // Assert
        assert!(matches!(result, Err(ProviderError::InvalidIdentifier(_))));
    }
}
