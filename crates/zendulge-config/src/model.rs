use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::ConfigError;

/// Environment variable that overrides [`Config::api_base_url`].
pub const API_URL_ENV: &str = "ZENDULGE_API_URL";

/// Stores client settings shared by the gateway, the local stores and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "Config::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default = "Config::default_page_size")]
    pub page_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional root for local client state. Defaults to the platform data dir.
    pub storage_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::default_api_base_url(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            log_filter: Self::default_log_filter(),
            page_size: Self::default_page_size(),
            storage_dir: None,
        }
    }
}

impl Config {
    pub fn default_api_base_url() -> String {
        "http://localhost:3000/api".into()
    }

    pub fn default_request_timeout_secs() -> u64 {
        30
    }

    pub fn default_log_filter() -> String {
        "zendulge_core=info".into()
    }

    pub fn default_page_size() -> usize {
        12
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> String {
        self.api_base_url.trim().trim_end_matches('/').to_string()
    }

    pub fn resolve_storage_dir(&self) -> PathBuf {
        if let Some(path) = &self.storage_dir {
            return path.clone();
        }

        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("zendulge")
    }

    /// Applies overrides looked up by variable name.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.api_base_url = trimmed.to_string();
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.normalized_base_url();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got `{}`",
                self.api_base_url
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        Ok(())
    }
}
