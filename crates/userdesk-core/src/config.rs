//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the API base URL and request timeout.
//!
//! Configuration is stored at `~/.config/userdesk/config.json`. The base URL
//! can be overridden per process with the `USERDESK_API_URL` environment
//! variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Application name used for config directory paths
const APP_NAME: &str = "userdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured base URL
pub const API_URL_ENV: &str = "USERDESK_API_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Pick the base URL: explicit override, then environment, then file, then default.
    pub fn resolve_api_url(&self, explicit: Option<&str>) -> String {
        let from_env = std::env::var(API_URL_ENV).ok();
        self.resolve_api_url_with(explicit, from_env.as_deref())
    }

    fn resolve_api_url_with(&self, explicit: Option<&str>, from_env: Option<&str>) -> String {
        [explicit, from_env, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.json")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_url: Some("https://users.example.com/api".to_string()),
            request_timeout_secs: Some(5),
        };
        config.save_to(&path).expect("save");
        assert_eq!(Config::load_from(&path).expect("load"), config);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").expect("write");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config {
            api_url: Some("http://file".to_string()),
            request_timeout_secs: None,
        };
        assert_eq!(config.resolve_api_url_with(Some("http://flag"), Some("http://env")), "http://flag");
        assert_eq!(config.resolve_api_url_with(None, Some("http://env")), "http://env");
        assert_eq!(config.resolve_api_url_with(None, Some("  ")), "http://file");
        assert_eq!(Config::default().resolve_api_url_with(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_request_timeout() {
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(30));
        let config = Config {
            api_url: None,
            request_timeout_secs: Some(0),
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        let config = Config {
            api_url: None,
            request_timeout_secs: Some(3),
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }
}
