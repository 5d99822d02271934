//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the `reqwest` client used by a provider.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub(crate) fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .gzip(true)
        .build()
        .context("failed to build HTTP client")
}

/// Parses a base URL, falling back to `default` when blank.
///
/// The path always ends with `/` so relative endpoints join under it.
///
/// # Errors
///
/// Returns an error if the resulting URL is not absolute.
pub(crate) fn resolve_base_url(configured: Option<&str>, default: &str) -> Result<Url> {
    let raw = configured.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.unwrap_or(default);
    let raw_result = Url::parse(raw);
    let mut url = raw_result.with_context(|| format!("invalid base URL: {raw}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("invalid base URL: {raw}");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Sends a GET request and decodes the JSON body.
///
/// `endpoint` is only used for logging and error reporting. The request URL
/// carries the API key, so it is never logged.
#[instrument(skip_all, fields(endpoint = endpoint))]
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    endpoint: &str,
    query: &[(&str, String)],
) -> ProviderResult<T> {
    let request = client
        .get(url)
        .query(query)
        .build()
        .map_err(|e| ProviderError::transport(endpoint, e))?;

    tracing::debug!(endpoint, "API request");

    let response = client
        .execute(request)
        .await
        .map_err(|e| ProviderError::transport(endpoint, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::transport(endpoint, e))?;

    if !status.is_success() {
        return Err(ProviderError::status(
            endpoint,
            status.as_u16(),
            upstream_message(&body),
        ));
    }

    if body.trim().is_empty() {
        return Err(ProviderError::EmptyResponse {
            endpoint: String::from(endpoint),
        });
    }

    serde_json::from_str(&body).map_err(|source| ProviderError::DecodeFailure {
        endpoint: String::from(endpoint),
        source,
    })
}

/// Extracts a readable message from an upstream error body.
///
/// Understands TMDB's `status_message` and OMDb's `Error` fields and falls
/// back to the raw body.
fn upstream_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.get("status_message")
            .or_else(|| v.get("Error"))
            .and_then(serde_json::Value::as_str)
    });
    match message {
        Some(m) => String::from(m),
        None if body.trim().is_empty() => String::from("<empty body>"),
        None => String::from(body.trim()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use serde::Deserialize;

    use super::*;
    use crate::error::NetworkCause;

    #[derive(Debug, Deserialize)]
    struct Sample {
        value: u32,
    }

    fn client_and_url(server: &wiremock::MockServer) -> (Client, Url) {
        let client = build_http_client("test/0.0.0", Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("{}/sample", server.uri())).unwrap();
        (client, url)
    }

    #[test]
    fn test_resolve_base_url_blank_uses_default() {
        // Arrange & Act
        let url = resolve_base_url(Some("  "), "https://www.omdbapi.com/").unwrap();

        // Assert
        assert_eq!(url.as_str(), "https://www.omdbapi.com/");
    }

    #[test]
    fn test_resolve_base_url_appends_slash() {
        // Arrange & Act
        let url = resolve_base_url(Some("http://localhost:8080/3"), "https://example.com/").unwrap();

        // Assert
        assert_eq!(url.as_str(), "http://localhost:8080/3/");
        assert_eq!(
            url.join("movie/550").unwrap().as_str(),
            "http://localhost:8080/3/movie/550"
        );
    }

    #[test]
    fn test_resolve_base_url_rejects_relative() {
        // Arrange & Act
        let result = resolve_base_url(Some("not a url"), "https://www.omdbapi.com/");

        // Assert
        assert!(result.unwrap_err().to_string().contains("invalid base URL"));
    }

    #[test]
    fn test_resolve_base_url_rejects_opaque() {
        // Arrange & Act
        let result = resolve_base_url(Some("mailto:someone@example.com"), "https://www.omdbapi.com/");

        // Assert
        assert!(result.unwrap_err().to_string().contains("invalid base URL"));
    }

    #[test]
    fn test_upstream_message_variants() {
        assert_eq!(
            upstream_message(r#"{"status_code":7,"status_message":"Invalid API key"}"#),
            "Invalid API key"
        );
        assert_eq!(
            upstream_message(r#"{"Response":"False","Error":"No API key provided."}"#),
            "No API key provided."
        );
        assert_eq!(upstream_message("gateway down"), "gateway down");
        assert_eq!(upstream_message(""), "<empty body>");
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("k", "v"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(r#"{"value":3}"#))
            .mount(&server)
            .await;
        let (client, url) = client_and_url(&server);

        // Act
        let sample: Sample = get_json(&client, url, "sample", &[("k", String::from("v"))])
            .await
            .unwrap();

        // Assert
        assert_eq!(sample.value, 3);
    }

    #[tokio::test]
    async fn test_get_json_empty_body() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let (client, url) = client_and_url(&server);

        // Act
        let result: ProviderResult<Sample> = get_json(&client, url, "sample", &[]).await;

        // Assert
        assert!(matches!(result, Err(ProviderError::EmptyResponse { .. })));
    }

    #[tokio::test]
    async fn test_get_json_shape_mismatch() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(r#"{"other":1}"#))
            .mount(&server)
            .await;
        let (client, url) = client_and_url(&server);

        // Act
        let result: ProviderResult<Sample> = get_json(&client, url, "sample", &[]).await;

        // Assert
        assert!(matches!(result, Err(ProviderError::DecodeFailure { .. })));
    }

    #[tokio::test]
    async fn test_get_json_http_error() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(401)
                    .set_body_string(r#"{"status_code":7,"status_message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;
        let (client, url) = client_and_url(&server);

        // Act
        let result: ProviderResult<Sample> = get_json(&client, url, "sample", &[]).await;

        // Assert
        match result {
            Err(ProviderError::NetworkFailure {
                cause: NetworkCause::Status { status, message },
                ..
            }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_transport_error() {
        // Arrange: nothing listens on port 1
        let client = build_http_client("test/0.0.0", Duration::from_secs(5)).unwrap();
        let url = Url::parse("http://127.0.0.1:1/sample").unwrap();

        // Act
        let result: ProviderResult<Sample> = get_json(&client, url, "sample", &[]).await;

        // Assert
        assert!(matches!(
            result,
            Err(ProviderError::NetworkFailure {
                cause: NetworkCause::Transport(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        // Arrange: nothing listens on port 1
        let client = build_http_client("test/0.0.0", Duration::from_secs(5)).unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();

        // Act
        let result: ProviderResult<Sample> = get_json(
            &client,
            url,
            "detail",
            &[("apikey", String::from("secret-key"))],
        )
        .await;

        // Assert
        let err = result.unwrap_err();
        let mut chain = vec![err.to_string(), format!("{err:?}")];
        let mut source = std::error::Error::source(&err);
        while let Some(e) = source {
            chain.push(e.to_string());
            source = e.source();
        }
        assert!(chain.iter().all(|text| !text.contains("secret-key")));
    }
}
