//! Runtime configuration read from the process environment and `.env` files.
//!
//! # Responsibility
//! - Resolve storage, catalog, cache and logging settings with defaults.
//! - Layer process environment over `.env` values.
//! - Reject malformed values at startup instead of at first use.
//!
//! # Invariants
//! - Every numeric bound is strictly positive.
//! - The catalog base URL is an http(s) URL without a trailing slash.

use crate::catalog::http::{DEFAULT_CATALOG_API_BASE, DEFAULT_CATALOG_TIMEOUT};
use crate::catalog::DEFAULT_CACHE_CAPACITY;
use crate::logging::default_log_level;
use crate::service::{PlaceLimits, DEFAULT_MAX_PLACES_PER_PROJECT};
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TRIPPLAN_DB_PATH";
pub const ENV_CATALOG_API_BASE: &str = "TRIPPLAN_CATALOG_API_BASE";
pub const ENV_MAX_PLACES_PER_PROJECT: &str = "TRIPPLAN_MAX_PLACES_PER_PROJECT";
pub const ENV_CATALOG_TIMEOUT_MS: &str = "TRIPPLAN_CATALOG_TIMEOUT_MS";
pub const ENV_CATALOG_CACHE_CAPACITY: &str = "TRIPPLAN_CATALOG_CACHE_CAPACITY";
pub const ENV_LOG_LEVEL: &str = "TRIPPLAN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TRIPPLAN_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "tripplan.sqlite3";

/// Configuration errors raised while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value could not be parsed as a positive integer.
    InvalidNumber { key: &'static str, value: String },
    /// Value parsed but must be greater than zero.
    MustBePositive(&'static str),
    /// Catalog base URL is empty or not http(s).
    InvalidCatalogUrl(String),
    /// An explicitly requested `.env` file could not be read or parsed.
    EnvFile { path: PathBuf, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "`{key}` must be a positive integer, got `{value}`")
            }
            Self::MustBePositive(key) => write!(f, "`{key}` must be greater than zero"),
            Self::InvalidCatalogUrl(value) => {
                write!(f, "catalog base url must start with http:// or https://, got `{value}`")
            }
            Self::EnvFile { path, message } => {
                write!(f, "failed to read env file `{}`: {message}", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings consumed by storage, catalog validation and the rules engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub catalog_api_base: String,
    pub catalog_timeout: Duration,
    pub cache_capacity: NonZeroUsize,
    pub max_places_per_project: usize,
    pub log_level: String,
    /// File logging is enabled only when a directory is configured.
    pub log_dir: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            catalog_api_base: DEFAULT_CATALOG_API_BASE.to_string(),
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            max_places_per_project: DEFAULT_MAX_PLACES_PER_PROJECT,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first
    /// when present; variables already set in the process win.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(
                "event=config_env_file module=config status=ok path={}",
                path.display()
            );
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration from `path` layered under the process environment.
    ///
    /// Unlike `from_env`, the file must exist. The process environment is not
    /// modified.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_values = read_env_file(path.as_ref())?;
        Self::from_layers(&file_values, |key| std::env::var(key).ok())
    }

    /// Resolves each key from `env` first and from `file_values` when `env`
    /// has no non-blank value.
    fn from_layers<F>(file_values: &HashMap<String, String>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| file_values.get(key).cloned())
        })
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(base) = read(ENV_CATALOG_API_BASE) {
            config.catalog_api_base = normalize_catalog_url(&base)?;
        }
        if let Some(value) = read(ENV_MAX_PLACES_PER_PROJECT) {
            config.max_places_per_project = parse_positive(ENV_MAX_PLACES_PER_PROJECT, &value)?;
        }
        if let Some(value) = read(ENV_CATALOG_TIMEOUT_MS) {
            let millis = parse_positive(ENV_CATALOG_TIMEOUT_MS, &value)?;
            config.catalog_timeout = Duration::from_millis(millis as u64);
        }
        if let Some(value) = read(ENV_CATALOG_CACHE_CAPACITY) {
            let capacity = parse_positive(ENV_CATALOG_CACHE_CAPACITY, &value)?;
            config.cache_capacity = NonZeroUsize::new(capacity)
                .ok_or(ConfigError::MustBePositive(ENV_CATALOG_CACHE_CAPACITY))?;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR);

        Ok(config)
    }

    pub fn place_limits(&self) -> PlaceLimits {
        PlaceLimits::new(self.max_places_per_project)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_error = |message: String| ConfigError::EnvFile {
        path: path.to_path_buf(),
        message,
    };
    let entries = dotenv::from_path_iter(path).map_err(|err| env_file_error(err.to_string()))?;
    let mut values = HashMap::new();
    for entry in entries {
        let (key, value) = entry.map_err(|err| env_file_error(err.to_string()))?;
        values.insert(key, value);
    }
    Ok(values)
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    let parsed = value
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })?;
    if parsed == 0 {
        return Err(ConfigError::MustBePositive(key));
    }
    Ok(parsed)
}

fn normalize_catalog_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty());
    if !has_scheme || !has_host {
        return Err(ConfigError::InvalidCatalogUrl(value.to_string()));
    }
    Ok(trimmed.to_string())
}
