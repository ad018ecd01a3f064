//! Configuration file handling.
//!
//! Every section has defaults, so an empty file (or no file at all) yields
//! a working configuration with the standard classification thresholds.

use crate::analysis::PatternThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `server.processor_url`.
pub const PROCESSOR_URL_ENV: &str = "PROCESSOR_URL";

/// Limits applied while decoding uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Largest accepted image, in pixels (width * height).
    pub max_pixels: u64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_pixels: 4096 * 4096,
        }
    }
}

/// HTTP service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Base URL of the external forensic processor, if any.
    pub processor_url: Option<String>,
    /// Processor request timeout in seconds.
    pub processor_timeout_secs: u64,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            processor_url: None,
            processor_timeout_secs: 120,
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory for stored uploads; in-memory storage when unset.
    pub root: Option<PathBuf>,
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("pixel limit must be non-zero")]
    InvalidPixelLimit,
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),
    #[error("upload limit must be non-zero")]
    InvalidUploadLimit,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Decoder limits.
    #[serde(default)]
    pub decode: DecodeConfig,
    /// Pattern classification bounds.
    #[serde(default)]
    pub thresholds: PatternThresholds,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(PROCESSOR_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.processor_url = Some(url);
            }
        }
        self
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decode.max_pixels == 0 {
            return Err(ConfigError::InvalidPixelLimit);
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit);
        }
        self.thresholds
            .validate()
            .map_err(ConfigError::InvalidThresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.server.processor_url.is_none());
        assert!(config.store.root.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.decode.max_pixels, DecodeConfig::default().max_pixels);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
            [server]
            port = 9000
            processor_url = "http://processor:5000"

            [store]
            root = "/var/lib/uploads"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.server.processor_url.as_deref(),
            Some("http://processor:5000")
        );
        assert_eq!(config.server.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(config.store.root, Some(PathBuf::from("/var/lib/uploads")));
    }

    #[test]
    fn test_zero_pixel_limit_invalid() {
        let result = FileConfig::from_toml("[decode]\nmax_pixels = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidPixelLimit)));
    }

    #[test]
    fn test_inverted_thresholds_invalid() {
        let result = FileConfig::from_toml(
            "[thresholds]\nmostly_ones_above = 30.0\nmostly_zeros_below = 70.0\n",
        );
        assert!(matches!(result, Err(ConfigError::InvalidThresholds(_))));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            FileConfig::from_toml("[decode"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
