//! TOML-based configuration.
//!
//! Example configuration:
//! ```toml
//! [query]
//! dialect = "tsql"       # tsql | postgres | mysql
//!
//! [definitions]
//! initial_capacity = 64  # initial size of the per-provider definition cache
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Query compilation settings.
    pub query: QuerySettings,

    /// Definition provider settings.
    pub definitions: DefinitionSettings,
}

/// Query compilation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Target SQL dialect name.
    pub dialect: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            dialect: "tsql".to_string(),
        }
    }
}

/// Definition provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefinitionSettings {
    /// Initial capacity of the per-provider definition cache.
    pub initial_capacity: usize,
}

impl Default for DefinitionSettings {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// The configured SQL dialect.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        self.query
            .dialect
            .parse()
            .map_err(|_| SettingsError::UnsupportedDialect(self.query.dialect.clone()))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        self.dialect()?;
        if self.definitions.initial_capacity == 0 {
            return Err(SettingsError::InvalidConfig(
                "definitions.initial_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
