//! OMDb API response types.

use serde::Deserialize;

use crate::model::{Movie, MovieDetail, cap_cast};
use crate::normalize::{duration_from_runtime_text, present, rating_from_text, split_list};

/// Response from the `?s=` search endpoint.
///
/// OMDb answers `Response: "False"` with an `Error` message when nothing
/// matched; `Search` is absent in that case.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSearchResponse {
    /// Matching summaries.
    #[serde(default)]
    pub search: Option<Vec<OmdbMovieSummary>>,
    /// Total number of matches, as text.
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    /// `"True"` or `"False"`.
    pub response: String,
    /// Error message when `response` is `"False"`.
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    /// Returns the summaries when the upstream reported success.
    #[must_use]
    pub fn into_summaries(self) -> Vec<OmdbMovieSummary> {
        if self.response != "True" {
            return Vec::new();
        }
        self.search.unwrap_or_default()
    }
}

/// A single search hit. Lacks runtime and rating.
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbMovieSummary {
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year, as text.
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    /// IMDb identifier (e.g. `tt0111161`).
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Poster URL or `"N/A"`.
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

/// Response from the `?i=` detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbMovieDetail {
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year, as text.
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    /// IMDb identifier.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Poster URL or `"N/A"`.
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
    /// Runtime such as `"136 min"`.
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    /// IMDb rating such as `"8.7"`.
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    /// Plot synopsis.
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    /// Comma-separated genres.
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    /// Comma-separated lead actors.
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
}

impl OmdbMovieDetail {
    /// Maps to the normalized summary.
    #[must_use]
    pub fn into_movie(self) -> Movie {
        Movie {
            rating: rating_from_text(self.imdb_rating.as_deref()),
            duration: duration_from_runtime_text(self.runtime.as_deref()),
            poster_url: present(self.poster),
            id: self.imdb_id,
            title: self.title,
        }
    }

    /// Maps to the normalized detail record.
    #[must_use]
    pub fn into_detail(self) -> MovieDetail {
        MovieDetail {
            rating: rating_from_text(self.imdb_rating.as_deref()),
            duration: duration_from_runtime_text(self.runtime.as_deref()),
            genres: split_list(self.genre.as_deref()),
            cast: cap_cast(split_list(self.actors.as_deref())),
            poster_url: present(self.poster),
            plot: present(self.plot),
            id: self.imdb_id,
            title: self.title,
            trailer_url: None,
        }
    }
}
