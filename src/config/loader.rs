use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable overriding `api.access_key`.
pub const ACCESS_KEY_ENV: &str = "PHOTOVOTE_ACCESS_KEY";

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
    /// Uses `~/.config/photovote/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("photovote").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields defaults. The access key from
    /// `PHOTOVOTE_ACCESS_KEY` wins over the file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        let mut config = if path.exists() {
            Self::parse_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Some(key) = std::env::var(ACCESS_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
        {
            self.api.access_key = Some(key);
        }
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - `api.base_url` is an http(s) URL
    /// - `api.per_page` is within 1..=30
    /// - at least one non-blank category, none duplicated
    /// - `vote.page_threshold` is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("api.base_url '{}' must start with http:// or https://", base_url),
            });
        }

        if !(1..=30).contains(&self.api.per_page) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "api.per_page must be between 1 and 30, got {}",
                    self.api.per_page
                ),
            });
        }

        if self.vote.categories.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "At least one vote category must be configured".to_string(),
            });
        }

        for (index, category) in self.vote.categories.iter().enumerate() {
            if category.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("vote.categories[{}] is blank", index),
                });
            }
            if self.vote.categories[..index].contains(category) {
                return Err(ConfigError::ValidationError {
                    message: format!("Category '{}' is listed twice", category),
                });
            }
        }

        if self.vote.page_threshold == 0 {
            return Err(ConfigError::ValidationError {
                message: "vote.page_threshold must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
