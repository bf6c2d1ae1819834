//! Configuration file loading and parsing.
//!
//! This module handles loading the optional configuration file from disk and
//! resolving the dictionary API key from the environment.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path given as the positional CLI argument (must exist)
//! 2. Default location (used only if present):
//!    - **Linux/macOS:** `~/.malsaem-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.malsaem-mcp\config.json`
//!
//! Without either, built-in defaults apply.
//!
//! # API Key
//!
//! The key is never read from the file. It comes from `MALSAEM_API_KEY`
//! (a `.env` file in the working directory is honoured).

mod settings;

pub use settings::{ApiConfig, ApiKey, Config, HttpConfig, LoggingConfig, DEFAULT_BASE_URL};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the environment variable holding the dictionary API key.
pub const API_KEY_ENV: &str = "MALSAEM_API_KEY";

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.malsaem-mcp/`
/// - **Windows:** `%USERPROFILE%\.malsaem-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".malsaem-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location, falling
/// back to [`Config::default`] when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Fields are invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Resolves the API key from an explicit value, `.env`, or the environment.
///
/// Returns `None` when no non-blank key is available. Whether that is fatal
/// depends on the transport.
#[must_use]
pub fn resolve_api_key(explicit: Option<&str>) -> Option<ApiKey> {
    if let Some(raw) = explicit {
        return ApiKey::new(raw).ok();
    }

    dotenv::dotenv().ok();
    std::env::var(API_KEY_ENV)
        .ok()
        .and_then(|raw| ApiKey::new(&raw).ok())
}
