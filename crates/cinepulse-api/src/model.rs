//! Normalized movie model shared by every provider.

use serde::{Deserialize, Serialize};

/// Maximum number of cast names kept on a [`MovieDetail`].
pub const MAX_CAST: usize = 12;

/// Sentinel used when a duration is unknown or unparseable.
pub const DURATION_UNKNOWN: &str = "N/A";

/// Lightweight movie summary used in listings and the favorites store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Provider-defined identifier (IMDb ID or TMDB numeric ID as text).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Rating on the provider's 0-10 scale, `0.0` when unknown.
    pub rating: f64,
    /// Runtime in minutes as text, or `"N/A"`.
    pub duration: String,
    /// Absolute poster URL.
    #[serde(rename = "posterURL", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// Fully populated movie record returned by `fetch_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// Provider-defined identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Rating on the provider's 0-10 scale, `0.0` when unknown.
    pub rating: f64,
    /// Runtime in minutes as text, or `"N/A"`.
    pub duration: String,
    /// Absolute poster URL.
    #[serde(rename = "posterURL", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Plot synopsis.
    #[serde(default)]
    pub plot: Option<String>,
    /// Genre names in provider order.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Cast display names in provider order, at most [`MAX_CAST`].
    #[serde(default)]
    pub cast: Vec<String>,
    /// Trailer URL.
    #[serde(rename = "trailerURL", default, skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
}

impl MovieDetail {
    /// Reduces the detail record to the summary stored in favorites.
    #[must_use]
    pub fn summary(&self) -> Movie {
        Movie {
            id: self.id.clone(),
            title: self.title.clone(),
            rating: self.rating,
            duration: self.duration.clone(),
            poster_url: self.poster_url.clone(),
        }
    }
}

/// Truncates a cast list to [`MAX_CAST`] entries.
#[must_use]
pub fn cap_cast(mut cast: Vec<String>) -> Vec<String> {
    cast.truncate(MAX_CAST);
    cast
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn sample_detail() -> MovieDetail {
        MovieDetail {
            id: String::from("tt0111161"),
            title: String::from("The Shawshank Redemption"),
            rating: 9.3,
            duration: String::from("142"),
            poster_url: Some(String::from("https://example.com/poster.jpg")),
            plot: Some(String::from("Two imprisoned men bond.")),
            genres: vec![String::from("Drama")],
            cast: vec![String::from("Tim Robbins")],
            trailer_url: None,
        }
    }

    #[test]
    fn test_summary_keeps_shared_fields() {
        // Arrange
        let detail = sample_detail();

        // Act
        let movie = detail.summary();

        // Assert
        assert_eq!(movie.id, "tt0111161");
        assert_eq!(movie.title, "The Shawshank Redemption");
        assert_eq!(movie.duration, "142");
        assert_eq!(movie.poster_url, detail.poster_url);
    }

    #[test]
    fn test_movie_json_uses_model_field_names() {
        // Arrange
        let movie = sample_detail().summary();

        // Act
        let json = serde_json::to_value(&movie).unwrap();

        // Assert
        assert_eq!(json["posterURL"], "https://example.com/poster.jpg");
        assert_eq!(json["id"], "tt0111161");
        assert!(json.get("poster_url").is_none());
    }

    #[test]
    fn test_movie_decodes_without_poster() {
        // Arrange
        let json = r#"{"id":"1","title":"T","rating":0.0,"duration":"N/A"}"#;

        // Act
        let movie: Movie = serde_json::from_str(json).unwrap();

        // Assert
        assert!(movie.poster_url.is_none());
        assert_eq!(movie.duration, DURATION_UNKNOWN);
    }

    #[test]
    fn test_cap_cast_truncates() {
        // Arrange
        let cast: Vec<String> = (0..20).map(|i| format!("Actor {i}")).collect();

        // Act
        let capped = cap_cast(cast);

        // Assert
        assert_eq!(capped.len(), MAX_CAST);
        assert_eq!(capped.first().map(String::as_str), Some("Actor 0"));
    }
}
