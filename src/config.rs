//! Configuration file parser for ~/.config/popcorn/config.toml.
//!
//! The file is optional. A missing or blank file yields `Config::default()`,
//! and unknown keys are accepted with a warning.
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::CatalogConfig;

/// Credential used when neither the environment nor the file supplies one.
pub const DEFAULT_API_KEY: &str = "d826a939";
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";
/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys may be given.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OMDb API key. `OMDB_API_KEY` takes precedence.
    pub api_key: Option<String>,

    /// Catalog endpoint. Must be HTTPS unless it points at localhost.
    pub base_url: String,

    /// Quiet period between the last keystroke and the search request.
    pub debounce_ms: u64,

    /// Queries shorter than this never reach the catalog.
    pub min_query_length: usize,

    /// Per-request timeout in seconds. 0 = wait indefinitely.
    pub request_timeout_secs: u64,

    /// Keybinding overrides: action name → key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            debounce_ms: 500,
            min_query_length: 3,
            request_timeout_secs: 0,
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("debounce_ms", &self.debounce_ms)
            .field("min_query_length", &self.min_query_length)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 6] = [
    "api_key",
    "base_url",
    "debounce_ms",
    "min_query_length",
    "request_timeout_secs",
    "keybindings",
];

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty or whitespace-only file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Over 1 MiB → `Err(ConfigError::TooLarge)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
                tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            debounce_ms = config.debounce_ms,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Picks the API key: environment first, then the file, then the built-in key.
    pub fn resolve_api_key(&self, from_env: Option<String>) -> SecretString {
        let key = from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        SecretString::from(key)
    }

    /// Catalog client settings, reading `OMDB_API_KEY` from the environment.
    pub fn catalog_config(&self) -> CatalogConfig {
        self.catalog_config_with_env(std::env::var(API_KEY_ENV).ok())
    }

    pub fn catalog_config_with_env(&self, env_key: Option<String>) -> CatalogConfig {
        CatalogConfig {
            base_url: self.base_url.clone(),
            api_key: self.resolve_api_key(env_key),
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
