//! Core configuration loaded from TOML.
//!
//! ```toml
//! [database]
//! path = "clinic.db"
//! seed_reference_catalog = true
//!
//! [logging]
//! level = "info"
//!
//! [suggestions]
//! log_top = 5
//! ```
//!
//! Every field has a default; a missing section falls back to its defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnosis::DEFAULT_LOG_TOP;

/// Path value that selects an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Install the built-in disease catalog on open
    #[serde(default = "default_seed_reference_catalog")]
    pub seed_reference_catalog: bool,
}

fn default_database_path() -> String {
    "clinic.db".to_string()
}

fn default_seed_reference_catalog() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            seed_reference_catalog: default_seed_reference_catalog(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Suggestion run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionsConfig {
    /// How many top-ranked diseases each run logs
    #[serde(default = "default_log_top")]
    pub log_top: usize,
}

fn default_log_top() -> usize {
    DEFAULT_LOG_TOP
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            log_top: default_log_top(),
        }
    }
}

/// Complete core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub suggestions: SuggestionsConfig,
}

impl CoreConfig {
    /// Load from a TOML file. A missing file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// An in-memory configuration, handy for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig {
                path: IN_MEMORY_PATH.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.database.path, "clinic.db");
        assert!(config.database.seed_reference_catalog);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.suggestions.log_top, 5);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(CoreConfig::from_toml_str("").unwrap(), CoreConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = CoreConfig::from_toml_str(
            r#"
            [database]
            path = ":memory:"

            [suggestions]
            log_top = 3
            "#,
        )
        .unwrap();

        assert!(config.database.is_in_memory());
        assert!(config.database.seed_reference_catalog);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.suggestions.log_top, 3);
    }

    #[test]
    fn test_invalid_toml() {
        let result = CoreConfig::from_toml_str("[database]\npath = 42\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CoreConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = CoreConfig::in_memory();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(CoreConfig::from_toml_str(&text).unwrap(), config);
    }
}
