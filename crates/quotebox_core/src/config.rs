//! Runtime configuration loaded from `config.toml`.
//!
//! # Responsibility
//! - Locate, parse and validate the config file.
//! - Resolve derived paths (database, logs).
//!
//! # Invariants
//! - A missing file yields defaults; an unparseable one is reported so the
//!   caller can decide to fall back.
//! - `sync_interval_secs >= 1` and `fetch_limit >= 1` after validation.

use crate::store::dedup::DedupStrategy;
use crate::sync::jsonplaceholder::{
    DEFAULT_ENDPOINT, DEFAULT_FETCH_LIMIT, JSONPLACEHOLDER_SOURCE_ID,
};
use crate::sync::schedule::DEFAULT_SYNC_INTERVAL;
use log::warn;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "quotebox";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "quotebox.db";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config io failed: {err}"),
            Self::Parse(err) => write!(f, "config is not valid TOML: {err}"),
            Self::Invalid(details) => write!(f, "invalid config: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuoteBoxConfig {
    /// Remote provider id: `jsonplaceholder` or `mock`.
    pub provider: String,
    /// Base URL of the JSONPlaceholder-compatible service.
    pub endpoint: String,
    /// Number of posts fetched per cycle.
    pub fetch_limit: u32,
    /// Period of scheduled sync cycles.
    pub sync_interval_secs: u64,
    /// Duplicate detection used by imports.
    pub dedup: DedupStrategy,
    pub log_level: Option<String>,
    /// Directory for the database and logs; platform data dir when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for QuoteBoxConfig {
    fn default() -> Self {
        Self {
            provider: JSONPLACEHOLDER_SOURCE_ID.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL.as_secs(),
            dedup: DedupStrategy::default(),
            log_level: None,
            data_dir: None,
        }
    }
}

impl QuoteBoxConfig {
    /// `<config_dir>/quotebox/config.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Reads and validates the config at `path`; a missing file is defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load_from`, but any failure is logged and yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "event=config_load module=config status=warn path={} error={}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("provider must not be empty".to_string()));
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.fetch_limit == 0 {
            return Err(ConfigError::Invalid(
                "fetch_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, QuoteBoxConfig};
    use crate::store::dedup::DedupStrategy;
    use std::path::PathBuf;

    #[test]
    fn partial_file_fills_remaining_fields_with_defaults() {
        let config: QuoteBoxConfig =
            toml::from_str("provider = \"mock\"\ndedup = \"text_category\"\n").unwrap();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.dedup, DedupStrategy::TextCategory);
        assert_eq!(config.sync_interval_secs, 10);
        assert_eq!(config.fetch_limit, 10);
    }

    #[test]
    fn file_values_drive_derived_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "sync_interval_secs = 30\ndata_dir = \"/var/lib/quotebox\"\n",
        )
        .unwrap();

        let config = QuoteBoxConfig::load_from(&path).unwrap();
        assert_eq!(config.sync_interval().as_secs(), 30);
        assert_eq!(
            config.log_dir(),
            PathBuf::from("/var/lib/quotebox/logs")
        );
        assert_eq!(
            config.db_path(),
            PathBuf::from("/var/lib/quotebox/quotebox.db")
        );
    }

    #[test]
    fn missing_file_is_default_and_zero_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            QuoteBoxConfig::load_from(dir.path().join("absent.toml")).unwrap(),
            QuoteBoxConfig::default()
        );

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sync_interval_secs = 0\n").unwrap();
        assert!(matches!(
            QuoteBoxConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(
            QuoteBoxConfig::load_or_default(Some(&path)),
            QuoteBoxConfig::default()
        );
    }
}
