//! Field normalization rules applied when mapping upstream DTOs.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::DURATION_UNKNOWN;

/// Placeholder OMDb uses for missing text fields.
const OMDB_MISSING: &str = "N/A";

/// Regex for the leading minutes token of a runtime such as `"136 min"`.
#[allow(clippy::expect_used)]
static RUNTIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("failed to compile runtime regex"));

/// Parses a textual rating, falling back to `0.0`.
///
/// ```text
/// "8.5" -> 8.5
/// ""    -> 0.0
/// "abc" -> 0.0
/// ```
#[must_use]
pub fn rating_from_text(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .map_or(0.0, rating_from_number)
}

/// Sanitizes a numeric rating. Non-finite values become `0.0`.
#[must_use]
pub const fn rating_from_number(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Extracts the leading minutes token from a free-text runtime.
///
/// Returns `"N/A"` when the runtime is absent or does not start with digits.
#[must_use]
pub fn duration_from_runtime_text(raw: Option<&str>) -> String {
    raw.and_then(|s| RUNTIME_RE.captures(s))
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || String::from(DURATION_UNKNOWN),
            |m| String::from(m.as_str()),
        )
}

/// Formats integer runtime minutes, or `"N/A"` when absent.
#[must_use]
pub fn duration_from_minutes(minutes: Option<u32>) -> String {
    minutes.map_or_else(|| String::from(DURATION_UNKNOWN), |m| m.to_string())
}

/// Splits comma-separated text into trimmed, non-empty tokens in order.
///
/// OMDb's `"N/A"` placeholder is dropped.
#[must_use]
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty() && *token != OMDB_MISSING)
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Drops empty strings and OMDb's `"N/A"` placeholder.
#[must_use]
pub fn present(raw: Option<String>) -> Option<String> {
    raw.filter(|s| {
        let trimmed = s.trim();
        !trimmed.is_empty() && trimmed != OMDB_MISSING
    })
}

/// Joins a relative image path onto an image host prefix.
#[must_use]
pub fn image_url(prefix: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let prefix = prefix.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{prefix}{path}"))
    } else {
        Some(format!("{prefix}/{path}"))
    }
}
