//! Runtime configuration for stores, slot labels and logging.
//!
//! # Responsibility
//! - Load `MealrollConfig` from a JSON file with built-in defaults.
//! - Apply environment overrides on top of the file.
//!
//! # Invariants
//! - Precedence is defaults < file < environment; CLI flags are applied by
//!   the caller afterwards.
//! - A missing implicit config file is not an error; a malformed one is.

use crate::logging::default_log_level;
use crate::model::meal::SlotLabels;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mealroll.json";
const DEFAULT_DB_FILE: &str = "mealroll.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "mealroll-logs";

pub const ENV_DB_PATH: &str = "MEALROLL_DB_PATH";
pub const ENV_LOG_DIR: &str = "MEALROLL_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "MEALROLL_LOG_LEVEL";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Effective application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealrollConfig {
    /// SQLite record store location.
    pub db_path: PathBuf,
    /// When set, the sheet file is the record store instead of SQLite.
    pub sheet_path: Option<PathBuf>,
    pub slot_labels: SlotLabels,
    pub log_level: String,
    /// Absolute directory for rolling logs; defaults under the temp dir.
    pub log_dir: Option<PathBuf>,
}

impl Default for MealrollConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            sheet_path: None,
            slot_labels: SlotLabels::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl MealrollConfig {
    /// Loads configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// present, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses one JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(db_path) = non_blank(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(log_dir) = non_blank(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(log_dir));
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }

    /// Returns the configured log directory or the temp-dir fallback.
    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME))
    }
}
