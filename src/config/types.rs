use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the Syncthing helper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_config_dir")]
    pub syncthing_config_dir: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_long_poll_timeout_secs")]
    pub long_poll_timeout_secs: u64,

    #[serde(default = "default_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub retry_max_backoff_ms: u64,

    #[serde(default)]
    pub retry_max_attempts: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            syncthing_config_dir: default_config_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            long_poll_timeout_secs: default_long_poll_timeout_secs(),
            retry_initial_backoff_ms: default_initial_backoff_ms(),
            retry_max_backoff_ms: default_max_backoff_ms(),
            retry_max_attempts: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn long_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.long_poll_timeout_secs.clamp(1, 300))
    }
}

fn default_api_base() -> String {
    "http://127.0.0.1:8384".to_string()
}

fn default_config_dir() -> String {
    match std::env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => {
            format!("{}/.config/syncthing", home.trim_end_matches('/'))
        }
        _ => ".config/syncthing".to_string(),
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_long_poll_timeout_secs() -> u64 {
    60
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}
