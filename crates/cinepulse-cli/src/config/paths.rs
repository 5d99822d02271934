//! Config file location.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Config file name inside the cinepulse config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolves the config file path.
///
/// In order: `{dir}/config.toml`, `$XDG_CONFIG_HOME/cinepulse/config.toml`,
/// `~/.config/cinepulse/config.toml`. `--dir` shares the directory with the
/// favorites database.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable (when
/// `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_from(dir, |name| std::env::var(name).ok())
}

/// Resolves the config path using `env` for variable lookups.
fn config_path_from(
    dir: Option<&PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE_NAME));
    }

    let config_home = env("XDG_CONFIG_HOME")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute());
    let base = match config_home {
        Some(base) => base,
        None => env("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .context("neither XDG_CONFIG_HOME nor HOME is set")?,
    };
    Ok(base.join("cinepulse").join(CONFIG_FILE_NAME))
}
