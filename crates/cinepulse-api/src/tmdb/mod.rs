//! TMDB API client module.
//!
//! Talks to TMDB v3: `search/movie`, `movie/popular` and the per-movie
//! detail, credits and videos endpoints.

mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, DEFAULT_IMAGE_BASE, DEFAULT_LANGUAGE, TmdbClient, TmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    TmdbCastMember, TmdbCredits, TmdbGenre, TmdbMovieDetails, TmdbMovieListItem,
    TmdbMovieListResponse, TmdbVideo, TmdbVideos,
};
