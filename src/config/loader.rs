use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::MonitorError;

use super::{paths, Config};

const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;
const MAX_LONG_POLL_TIMEOUT_SECS: u64 = 300;

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let mut config = match Self::try_load().await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        info!(
            api_base = %config.api_base,
            dir = %config.syncthing_config_dir,
            "Loaded configuration"
        );
        config
    }

    /// Load configuration from an explicit path. A missing file yields defaults.
    pub async fn load_from(path: &Path) -> Result<Self, MonitorError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| MonitorError::Config(format!("Failed to read config file: {err}")))?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, MonitorError> {
        let config: Config = serde_json::from_str(contents)
            .map_err(|err| MonitorError::Config(format!("Failed to parse config.json: {err}")))?;

        if config.api_base.trim().is_empty() {
            return Err(MonitorError::Config("api_base must not be empty".to_string()));
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&config.request_timeout_secs) {
            return Err(MonitorError::Config(format!(
                "request_timeout_secs must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }
        if !(1..=MAX_LONG_POLL_TIMEOUT_SECS).contains(&config.long_poll_timeout_secs) {
            return Err(MonitorError::Config(format!(
                "long_poll_timeout_secs must be between 1 and {MAX_LONG_POLL_TIMEOUT_SECS}"
            )));
        }
        if config.retry_max_backoff_ms < config.retry_initial_backoff_ms {
            return Err(MonitorError::Config(
                "retry_max_backoff_ms must be >= retry_initial_backoff_ms".to_string(),
            ));
        }

        Ok(config)
    }

    /// `SYNCTHING_API_URL` and `SYNCTHING_API_KEY` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(custom) = env::var("SYNCTHING_API_URL") {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                self.api_base = trimmed.to_string();
            }
        }
        if let Ok(key) = env::var("SYNCTHING_API_KEY") {
            let trimmed = key.trim();
            if !trimmed.is_empty() {
                self.api_key = Some(trimmed.to_string());
            }
        }
    }

    async fn try_load() -> Result<Self, MonitorError> {
        let config_path = paths::get_config_path()?;
        Self::load_from(&config_path).await
    }
}
