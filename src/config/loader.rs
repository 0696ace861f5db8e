use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::screen::image::PROMPT_PLACEHOLDER;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/promptdeck/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("promptdeck").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path. A missing
    /// file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), model = %config.service.model, "Loaded config");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The model name is not empty
    /// - The base URL is http(s)
    /// - Temperature lies in `0.0..=2.0`
    /// - Timeouts and the transition capacity are non-zero
    /// - The image prompt template contains `{input}`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let service = &self.service;

        if service.model.trim().is_empty() {
            return Err(invalid("service.model must not be empty"));
        }

        if !(service.base_url.starts_with("http://") || service.base_url.starts_with("https://")) {
            return Err(invalid(format!(
                "service.base_url '{}' must start with http:// or https://",
                service.base_url
            )));
        }

        if !(0.0..=2.0).contains(&service.temperature) {
            return Err(invalid(format!(
                "service.temperature {} is outside 0.0..=2.0",
                service.temperature
            )));
        }

        let defaults = &self.defaults;
        for (name, value) in [
            ("timeout_seconds", defaults.timeout_seconds),
            ("connect_timeout_seconds", defaults.connect_timeout_seconds),
            ("idle_timeout_seconds", defaults.idle_timeout_seconds),
        ] {
            if value == 0 {
                return Err(invalid(format!("defaults.{name} must be greater than 0")));
            }
        }

        if defaults.transition_capacity == 0 {
            return Err(invalid("defaults.transition_capacity must be greater than 0"));
        }

        if !self.image.prompt_template.contains(PROMPT_PLACEHOLDER) {
            return Err(invalid(format!(
                "image.prompt_template must contain {PROMPT_PLACEHOLDER}"
            )));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}
