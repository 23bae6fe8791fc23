use tokio::fs;
use tracing::debug;

use crate::config::Config;
use crate::types::MonitorError;

/// Resolve the API key: explicit configuration first, then the daemon's config.xml.
pub async fn load_api_key(config: &Config) -> Result<String, MonitorError> {
    if let Some(key) = config.api_key.as_deref() {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    let config_xml_path = config.syncthing_config_xml_path();
    debug!(path = %config_xml_path.display(), "Reading API key from Syncthing config");
    let contents = fs::read_to_string(&config_xml_path).await?;
    extract_api_key(&contents).ok_or(MonitorError::MissingApiKey)
}

fn extract_api_key(contents: &str) -> Option<String> {
    let start_tag = "<apikey>";
    let end_tag = "</apikey>";
    let start = contents.find(start_tag)? + start_tag.len();
    let rest = &contents[start..];
    let end = rest.find(end_tag)?;
    let key = rest[..end].trim();
    (!key.is_empty()).then(|| key.to_string())
}
