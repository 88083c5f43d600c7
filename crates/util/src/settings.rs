//! Settings for the qflow CLI/TUI.
//!
//! Values come from, in increasing precedence:
//!
//! 1. built-in defaults,
//! 2. a JSON file (`~/.config/qflow/config.json` on most platforms, or the
//!    path in `QFLOW_CONFIG_PATH`),
//! 3. `QFLOW_API_BASE` / `QFLOW_POLL_INTERVAL_SECS`,
//! 4. an explicit override from the command line ([`Settings::with_api_base`]).
//!
//! A missing file is not an error; a malformed one is.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use qflow_api::{ClientConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::expand_tilde;

/// Environment variable allowing callers to override the settings file path.
pub const CONFIG_PATH_ENV: &str = "QFLOW_CONFIG_PATH";
pub const API_BASE_ENV: &str = "QFLOW_API_BASE";
pub const POLL_INTERVAL_ENV: &str = "QFLOW_POLL_INTERVAL_SECS";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "qflow.log";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value '{value}' for {name}: expected a positive number of seconds")]
    InvalidEnv { name: &'static str, value: String },
}

/// Persisted and overridable settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

impl Settings {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let path = default_settings_path();
        let mut settings = Self::load_from(&path)?;
        settings.apply_env()?;
        Ok(settings)
    }

    /// Read a settings file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn apply_env(&mut self) -> Result<(), SettingsError> {
        if let Ok(base) = env::var(API_BASE_ENV)
            && !base.trim().is_empty()
        {
            self.api_base = Some(base.trim().to_string());
        }
        if let Ok(raw) = env::var(POLL_INTERVAL_ENV)
            && !raw.trim().is_empty()
        {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or(SettingsError::InvalidEnv {
                    name: POLL_INTERVAL_ENV,
                    value: raw.clone(),
                })?;
            self.poll_interval_secs = Some(seconds);
        }
        Ok(())
    }

    /// Replace the base URL when `api_base` is provided.
    #[must_use]
    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        if let Some(base) = api_base {
            self.api_base = Some(base);
        }
        self
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base().to_string(),
            timeout: self
                .request_timeout_secs
                .filter(|seconds| *seconds > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    /// Dashboard refresh period; never zero.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

fn qflow_config_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("qflow")
}

pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }
    qflow_config_dir().join(CONFIG_FILE_NAME)
}

/// Where the TUI writes its log, since the terminal is taken.
pub fn default_log_path() -> PathBuf {
    qflow_config_dir().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_base(), "http://localhost:8000");
        assert_eq!(settings.client_config().timeout, Duration::from_secs(30));
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn file_values_are_used() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"api_base": "https://qflow.example.com", "request_timeout_secs": 10, "poll_interval_secs": 2}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.client_config().base_url, "https://qflow.example.com");
        assert_eq!(settings.client_config().timeout, Duration::from_secs(10));
        assert_eq!(settings.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn zero_intervals_fall_back_to_defaults() {
        let settings = Settings {
            api_base: None,
            request_timeout_secs: Some(0),
            poll_interval_secs: Some(0),
        };
        assert_eq!(settings.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(settings.client_config().timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn env_overrides_file_and_cli_overrides_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_base": "http://localhost:9000", "poll_interval_secs": 30}"#).unwrap();

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (API_BASE_ENV, Some("http://127.0.0.1:8001")),
                (POLL_INTERVAL_ENV, Some("7")),
            ],
            || {
                let settings = Settings::load().unwrap();
                assert_eq!(settings.api_base(), "http://127.0.0.1:8001");
                assert_eq!(settings.poll_interval(), Duration::from_secs(7));

                let settings = settings.with_api_base(Some("http://localhost:1234".into()));
                assert_eq!(settings.api_base(), "http://localhost:1234");
            },
        );
    }

    #[test]
    fn invalid_poll_interval_env_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (API_BASE_ENV, None),
                (POLL_INTERVAL_ENV, Some("soon")),
            ],
            || {
                assert!(matches!(Settings::load(), Err(SettingsError::InvalidEnv { .. })));
            },
        );
    }

    #[test]
    fn default_path_honors_env_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/qflow-settings.json"), || {
            assert_eq!(default_settings_path(), PathBuf::from("/tmp/qflow-settings.json"));
        });
    }
}
