//! Process configuration.
//!
//! # Responsibility
//! - Load database and logging settings once at process start.
//! - Layer a JSON config file and environment overrides over defaults.
//!
//! # Invariants
//! - Missing config keys keep their defaults; unknown keys are rejected.
//! - Empty environment values are ignored.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Names a JSON config file to load before environment overrides.
pub const CONFIG_PATH_ENV: &str = "CONTACTMGR_CONFIG";
pub const DB_PATH_ENV: &str = "CONTACTMGR_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CONTACTMGR_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CONTACTMGR_LOG_DIR";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings consumed by the session factory and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite database file. `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    /// - Returns an error when `CONTACTMGR_CONFIG` names an unreadable or
    ///   malformed file.
    pub fn load() -> ConfigResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`], reading variables through `lookup`.
    pub fn load_with<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_empty(lookup(CONFIG_PATH_ENV)) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = non_empty(lookup(DB_PATH_ENV)) {
            self.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = non_empty(lookup(LOG_LEVEL_ENV)) {
            self.log_level = value;
        }
        if let Some(value) = non_empty(lookup(LOG_DIR_ENV)) {
            self.log_dir = Some(PathBuf::from(value));
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_use_in_memory_database_and_stderr_logging() {
        let config = AppConfig::load_with(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.db_path.is_none());
        assert!(config.log_dir.is_none());
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn json_keeps_defaults_for_missing_keys() {
        let config = AppConfig::from_json_str(r#"{ "db_path": "/tmp/contacts.db" }"#).unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/contacts.db")));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn json_rejects_unknown_keys() {
        let err = AppConfig::from_json_str(r#"{ "dialect": "mysql" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_win_over_file_and_ignore_empty_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "db_path": "/srv/file.db", "log_level": "warn", "log_dir": "/var/log/cm" }}"#
        )
        .unwrap();
        let config_path = file.path().to_str().unwrap().to_string();

        let config = AppConfig::load_with(lookup_from(&[
            (CONFIG_PATH_ENV, config_path.as_str()),
            (DB_PATH_ENV, "/srv/env.db"),
            (LOG_LEVEL_ENV, "  "),
        ]))
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/srv/env.db")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/cm")));
    }

    #[test]
    fn missing_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        let err = AppConfig::from_file(&missing).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
