//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Default location: `<config dir>/profile-router/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("profile-router").join("config.json"))
}

/// Load and validate configuration from a JSON or TOML file.
///
/// The format follows the file extension; anything other than `.toml` is
/// read as JSON.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let mut config = if is_toml {
        parse_toml(&content)?
    } else {
        parse_json(&content)?
    };

    config.apply_defaults();
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a JSON document without touching the filesystem.
pub fn parse_json(content: &str) -> Result<RouterConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a TOML document without touching the filesystem.
pub fn parse_toml(content: &str) -> Result<RouterConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}
