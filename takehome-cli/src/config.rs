//! Optional TOML settings file.
//!
//! ```toml
//! backend = "sqlite"
//! database = "/home/me/.local/share/takehome.db"
//! tables_dir = "tables/2025"
//! log_level = "debug"
//! log_file = "takehome.log"
//! ```
//!
//! Every key is optional. Command-line flags win over file values, and
//! file values win over the built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use takehome_core::db::DbConfig;
use thiserror::Error;

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings as they appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend: Option<String>,
    pub database: Option<String>,
    pub tables_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml(
        path: &Path,
        text: &str,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &text)
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<String>,
    pub database: Option<String>,
    pub tables_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbConfig,
    /// `None` selects the embedded 2024 tables.
    pub tables_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            tables_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn resolve(
        file: FileConfig,
        overrides: ConfigOverrides,
    ) -> Self {
        let defaults = Self::default();
        Self {
            db: DbConfig::new(
                overrides
                    .backend
                    .or(file.backend)
                    .unwrap_or(defaults.db.backend),
                overrides
                    .database
                    .or(file.database)
                    .unwrap_or(defaults.db.connection_string),
            ),
            tables_dir: overrides.tables_dir.or(file.tables_dir),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            log_file: file.log_file,
        }
    }

    /// Reads `path` when given and layers `overrides` on top.
    pub fn load(
        path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, overrides))
    }
}
