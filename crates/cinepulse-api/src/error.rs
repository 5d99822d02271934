//! Provider error taxonomy.

/// Result alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by movie data providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure or non-success HTTP status.
    #[error("network failure on {endpoint}")]
    NetworkFailure {
        /// Endpoint path that was requested.
        endpoint: String,
        /// Underlying cause.
        #[source]
        cause: NetworkCause,
    },

    /// The upstream answered successfully but sent no body.
    #[error("empty response from {endpoint}")]
    EmptyResponse {
        /// Endpoint path that was requested.
        endpoint: String,
    },

    /// The body did not match the expected shape.
    #[error("failed to decode response from {endpoint}")]
    DecodeFailure {
        /// Endpoint path that was requested.
        endpoint: String,
        /// JSON decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The caller-supplied identifier is malformed. No request was issued.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Cause carried by [`ProviderError::NetworkFailure`].
#[derive(Debug, thiserror::Error)]
pub enum NetworkCause {
    /// The request could not be built, sent, or its body read.
    ///
    /// The request URL is stripped because it carries the API key.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The endpoint URL could not be built from the base URL.
    #[error("failed to build request URL")]
    InvalidUrl(#[from] url::ParseError),

    /// The upstream returned a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Upstream error message or raw body.
        message: String,
    },
}

impl ProviderError {
    /// Builds a [`ProviderError::NetworkFailure`] from a transport error.
    pub(crate) fn transport(endpoint: &str, err: reqwest::Error) -> Self {
        Self::NetworkFailure {
            endpoint: String::from(endpoint),
            cause: NetworkCause::Transport(err.without_url()),
        }
    }

    /// Builds a [`ProviderError::NetworkFailure`] from a URL join failure.
    pub(crate) fn invalid_url(endpoint: &str, err: url::ParseError) -> Self {
        Self::NetworkFailure {
            endpoint: String::from(endpoint),
            cause: NetworkCause::InvalidUrl(err),
        }
    }

    /// Builds a [`ProviderError::NetworkFailure`] from an HTTP status.
    pub(crate) fn status(endpoint: &str, status: u16, message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            endpoint: String::from(endpoint),
            cause: NetworkCause::Status {
                status,
                message: message.into(),
            },
        }
    }

    /// Returns the endpoint the error relates to, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::NetworkFailure { endpoint, .. }
            | Self::EmptyResponse { endpoint }
            | Self::DecodeFailure { endpoint, .. } => Some(endpoint),
            Self::InvalidIdentifier(_) => None,
        }
    }
}
