//! TMDB API response types.

use serde::Deserialize;

use crate::model::{Movie, MovieDetail, cap_cast};
use crate::normalize::{duration_from_minutes, image_url, rating_from_number};

/// Video host whose trailers are picked.
const TRAILER_SITE: &str = "YouTube";

/// Watch URL prefix for [`TRAILER_SITE`] keys.
const TRAILER_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

// --- Search / Popular ---

/// Paged movie listing from `search/movie` and `movie/popular`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieListResponse {
    /// Current page number.
    pub page: u32,
    /// Listed movies.
    pub results: Vec<TmdbMovieListItem>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A single movie in a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieListItem {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Runtime in minutes (listings normally omit it).
    #[serde(default)]
    pub runtime: Option<u32>,
}

impl TmdbMovieListItem {
    /// Maps to the normalized summary.
    #[must_use]
    pub fn into_movie(self, image_base: &str) -> Movie {
        Movie {
            id: self.id.to_string(),
            title: self.title,
            rating: self.vote_average.map_or(0.0, rating_from_number),
            duration: duration_from_minutes(self.runtime),
            poster_url: image_url(image_base, self.poster_path.as_deref()),
        }
    }
}

// --- Details ---

/// Response from `movie/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Genres in display order.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

impl TmdbMovieDetails {
    /// Maps to the normalized detail record, merging the enrichment results.
    #[must_use]
    pub fn into_detail(
        self,
        image_base: &str,
        cast: Vec<String>,
        trailer_url: Option<String>,
    ) -> MovieDetail {
        MovieDetail {
            id: self.id.to_string(),
            title: self.title,
            rating: self.vote_average.map_or(0.0, rating_from_number),
            duration: duration_from_minutes(self.runtime),
            poster_url: image_url(image_base, self.poster_path.as_deref()),
            plot: self.overview.filter(|o| !o.trim().is_empty()),
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            cast: cap_cast(cast),
            trailer_url,
        }
    }
}

/// A genre entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- Credits ---

/// Response from `movie/{id}/credits`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    /// Cast members in billing order.
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

/// A cast member.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    /// Display name.
    pub name: String,
    /// Character name.
    #[serde(default)]
    pub character: Option<String>,
}

impl TmdbCredits {
    /// Returns cast names in billing order, capped.
    #[must_use]
    pub fn cast_names(self) -> Vec<String> {
        cap_cast(self.cast.into_iter().map(|m| m.name).collect())
    }
}

// --- Videos ---

/// Response from `movie/{id}/videos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbVideos {
    /// Attached videos.
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

/// A single attached video.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    /// Site-specific video key.
    pub key: String,
    /// Hosting site (e.g. `YouTube`).
    pub site: String,
    /// Video type (e.g. `Trailer`, `Teaser`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl TmdbVideos {
    /// Picks the first `YouTube` trailer and returns its watch URL.
    #[must_use]
    pub fn trailer_url(&self) -> Option<String> {
        self.results
            .iter()
            .find(|v| {
                v.site.eq_ignore_ascii_case(TRAILER_SITE)
                    && v.kind.to_lowercase().contains("trailer")
            })
            .map(|v| format!("{TRAILER_WATCH_URL}{}", v.key))
    }
}
