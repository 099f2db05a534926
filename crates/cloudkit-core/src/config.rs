//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the platform API base URL and the HTTP request timeout.
//!
//! Configuration is stored at `~/.config/cloudkit/config.json`. The
//! credential file sits next to it as `token.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

/// Application name used for the config directory path
const APP_NAME: &str = "cloudkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Platform API used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.v2.vapor.cloud";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Overrides `api_url` from the config file
pub const API_URL_ENV: &str = "CLOUDKIT_API_URL";

/// Overrides the directory holding config and credentials
pub const CONFIG_DIR_ENV: &str = "CLOUDKIT_CONFIG_DIR";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it is absent.
    /// `CLOUDKIT_API_URL` wins over the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_dir()?.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Directory holding `config.json` and `token.json`.
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Join an API path onto the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
