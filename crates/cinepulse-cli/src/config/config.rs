//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cinepulse_api::{DEFAULT_TIMEOUT, ProviderKind, ProviderSettings};
use cinepulse_db::CorruptionPolicy;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when `provider.api_key` is blank.
pub const API_KEY_ENV: &str = "CINEPULSE_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Movie provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Favorites store settings.
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

/// Movie provider configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Which upstream to use (`omdb` or `tmdb`).
    pub kind: ProviderKind,
    /// Base URL override. Blank keeps the public endpoint.
    pub base_url: Option<String>,
    /// API key. Blank falls back to [`API_KEY_ENV`].
    pub api_key: Option<String>,
    /// Per-request timeout in seconds. `0` keeps the default.
    pub timeout_secs: u64,
    /// Response language (TMDB only).
    pub language: Option<String>,
    /// Seed query for the popular listing (OMDb only).
    pub popular_query: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            language: None,
            popular_query: None,
        }
    }
}

/// Favorites store configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FavoritesConfig {
    /// What to do with an undecodable favorites blob.
    #[serde(default)]
    pub on_corrupt: CorruptionPolicy,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Builds provider settings, reading the API key from the environment
    /// when the config leaves it blank.
    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        self.provider_settings_with(std::env::var(API_KEY_ENV).ok())
    }

    /// Builds provider settings with an explicit fallback API key.
    fn provider_settings_with(&self, env_key: Option<String>) -> ProviderSettings {
        let p = &self.provider;
        let api_key = p
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or(env_key)
            .unwrap_or_default();
        let timeout = if p.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(p.timeout_secs)
        };

        ProviderSettings {
            kind: p.kind,
            base_url: p.base_url.clone(),
            api_key,
            timeout,
            language: p.language.clone(),
            popular_query: p.popular_query.clone(),
            user_agent: String::from(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        }
    }
}
