use std::path::PathBuf;
use tracing::{debug, warn};

use crate::types::MonitorError;

use super::Config;

impl Config {
    /// Get the full path to the Syncthing config XML file
    pub fn syncthing_config_xml_path(&self) -> PathBuf {
        PathBuf::from(self.syncthing_config_dir.trim_end_matches('/')).join("config.xml")
    }
}

/// Get the path to the config.json file
/// Looks for config.json in the app directory (parent of the binary's folder)
pub(super) fn get_config_path() -> Result<PathBuf, MonitorError> {
    // Executable is at: app_root/bin/syncthing-helper
    // Config should be at: app_root/config.json
    if let Ok(exe_path) = std::env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(app_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = app_root.join("config.json");
            debug!(path = %config_path.display(), "Looking for config");
            if config_path.exists() {
                return Ok(config_path);
            }
        }
    }

    // Fallback: look in current directory
    warn!("Using fallback: looking for config.json in current directory");
    Ok(PathBuf::from("config.json"))
}
