//! OMDb API client module.
//!
//! Searches by title and hydrates each hit with a detail lookup so that
//! rating and runtime are populated.

mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, DEFAULT_POPULAR_QUERY, MAX_HYDRATE, OmdbClient, OmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{OmdbMovieDetail, OmdbMovieSummary, OmdbSearchResponse};
