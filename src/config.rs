//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Base URL used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Config pointing at the given base URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }
}

/// Local storage configuration (where the logged-in user is kept)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("punchcard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./punchcard_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session timer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    1000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl TimerConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Strip whitespace and trailing slashes; empty input falls back to the default URL
pub fn normalize_base_url(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let trimmed = compact.trim_end_matches('/');

    if trimmed.is_empty() {
        DEFAULT_API_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, default locations, or environment.
    ///
    /// An explicit path must load. Default-location files that exist but
    /// fail to load are skipped and returned so the caller can report them
    /// once logging is set up.
    pub fn load_default(explicit: Option<&Path>) -> Result<(Self, Vec<ConfigError>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load_with_env(path)?, Vec::new()));
        }

        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("punchcard").join("config.toml")),
            Some(PathBuf::from("./punchcard.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self::load_first(&config_paths))
    }

    /// Load the first existing candidate that parses, falling back to
    /// environment-only config
    pub fn load_first(candidates: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut skipped = Vec::new();

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {:?}", path);
                    return (config, skipped);
                }
                Err(e) => skipped.push(e),
            }
        }

        tracing::debug!("Using default config with environment overrides");
        (Self::from_env(), skipped)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(url) = lookup("PUNCHCARD_API_BASE_URL") {
            self.api.base_url = normalize_base_url(&url);
        }
        if let Some(timeout) = lookup("PUNCHCARD_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.trim().parse() {
                self.api.request_timeout_secs = secs;
            }
        }

        // Storage overrides
        if let Some(data_dir) = lookup("PUNCHCARD_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Logging overrides
        if let Some(level) = lookup("PUNCHCARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PUNCHCARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Directory holding the local storage file
    pub fn data_dir(&self) -> PathBuf {
        match (self.storage.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.storage.data_dir),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Punchcard Configuration
#
# Environment variables override these settings:
# - PUNCHCARD_API_BASE_URL
# - PUNCHCARD_REQUEST_TIMEOUT_SECS
# - PUNCHCARD_DATA_DIR
# - PUNCHCARD_LOG_LEVEL
# - PUNCHCARD_LOG_FORMAT

[api]
# Time-tracking backend URL
base_url = "http://localhost:8080"

# Request timeout in seconds
request_timeout_secs = 30

[storage]
# Directory holding the logged-in user
data_dir = "~/.local/share/punchcard"

[timer]
# How often the running timer is redrawn (ms)
tick_interval_ms = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}
