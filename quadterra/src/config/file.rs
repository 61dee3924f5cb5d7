//! Configuration file handling for ~/.quadterra/config.ini.
//!
//! Settings structs live in [`super::settings`], constants in
//! [`super::defaults`] and INI parsing in [`super::parser`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Required setting absent
    #[error("Missing configuration: {section}.{key}")]
    Missing { section: String, key: String },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.quadterra/config.ini).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini =
            Ini::load_from_str(text).map_err(|e| ConfigError::ReadError(ini::Error::Parse(e)))?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.quadterra).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quadterra")
}

/// Get the path to the config file (~/.quadterra/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
