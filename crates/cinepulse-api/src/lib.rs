//! Movie data providers for cinepulse.
//!
//! Provides OMDb and TMDB clients behind one [`LocalMovieProvider`] trait,
//! the normalized [`Movie`] / [`MovieDetail`] model and the fan-out join
//! policies the clients are built on.

/// Provider error taxonomy.
pub mod error;

/// Fan-out/join primitives.
pub mod fanout;

mod http;

/// Normalized movie model.
pub mod model;

/// Upstream value normalization.
pub mod normalize;

/// OMDb API client.
pub mod omdb;

/// Provider trait and configuration-selected dispatch.
pub mod provider;

/// TMDB API client.
pub mod tmdb;

pub use error::{NetworkCause, ProviderError, ProviderResult};
pub use http::DEFAULT_TIMEOUT;
pub use model::{Movie, MovieDetail};
pub use provider::{
    LocalMovieProvider, MovieProvider, Provider, ProviderKind, ProviderSettings, load_listing,
};
