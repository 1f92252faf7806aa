//! Display configuration.
//!
//! The config file is optional, every value has a default.
//!
//! # Config file locations
//!
//! Priority order:
//! 1. `$MMDISPLAY_CONFIG` environment variable
//! 2. `~/.config/mmdisplay/config.toml`
use std::path::{Path, PathBuf};

use mmdisplay_codec::CopyPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lut::CompositeMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DisplayConfig {
    pub composite: CompositeConfig,
    pub codec: CodecConfig,
    pub render: RenderConfig,
}

/// Initial state of new composite displays.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CompositeConfig {
    pub initial_mode: CompositeMode,
    /// Title of displays opened without one.
    pub title: String,
}

/// Conversion of acquired images for display.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CodecConfig {
    /// Whether installed images are copied or borrowed during conversion.
    pub copy_policy: PixelPolicy,
}

/// The rendering thread.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenderConfig {
    pub thread_name: String,
}

/// Serialized form of [`CopyPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelPolicy {
    Alias,
    #[default]
    Copy,
}

impl DisplayConfig {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "No config file found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: DisplayConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the config file path based on the environment.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MMDISPLAY_CONFIG") {
            return PathBuf::from(path);
        }

        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/mmdisplay/config.toml")
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.render.thread_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "render.thread_name must not be empty".to_string(),
            ));
        }

        if self.render.thread_name.contains('\0') {
            return Err(ConfigError::ValidationError(
                "render.thread_name must not contain NUL bytes".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            initial_mode: CompositeMode::Composite,
            title: "Untitled".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            thread_name: "mmdisplay-render".to_string(),
        }
    }
}

impl From<PixelPolicy> for CopyPolicy {
    fn from(policy: PixelPolicy) -> Self {
        match policy {
            PixelPolicy::Alias => CopyPolicy::Alias,
            PixelPolicy::Copy => CopyPolicy::Copy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = DisplayConfig::parse("").unwrap();
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(CopyPolicy::from(config.codec.copy_policy), CopyPolicy::Copy);
    }

    #[test]
    fn partial_sections() {
        let config = DisplayConfig::parse(
            r#"
            [composite]
            initial_mode = "grayscale"

            [codec]
            copy_policy = "alias"
            "#,
        )
        .unwrap();

        assert_eq!(config.composite.initial_mode, CompositeMode::Grayscale);
        assert_eq!(config.composite.title, "Untitled");
        assert_eq!(config.codec.copy_policy, PixelPolicy::Alias);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = DisplayConfig::parse("[render]\nthreads = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn empty_thread_name_rejected() {
        let err = DisplayConfig::parse("[render]\nthread_name = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let path = Path::new("/nonexistent/mmdisplay/config.toml");
        assert_eq!(DisplayConfig::load_from(path).unwrap(), DisplayConfig::default());
    }

    #[test]
    fn serializes_back() {
        let config = DisplayConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(DisplayConfig::parse(&text).unwrap(), config);
    }
}
