use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::types::MonitorError;

/// Event type emitted when a folder moves between states.
pub const STATE_CHANGED: &str = "StateChanged";

/// The subset of `/rest/system/config` this client reads.
#[derive(Debug, Deserialize)]
pub struct SyncthingConfig {
    folders: Vec<Value>,
}

/// A folder entry that carries both required fields.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FolderConfig {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl SyncthingConfig {
    /// The `folders` array itself is required; individual entries are not.
    pub fn from_value(value: Value) -> Result<Self, MonitorError> {
        serde_json::from_value(value).map_err(|err| {
            MonitorError::malformed(format!("system/config has no folders array: {err}"))
        })
    }

    /// Folder entries with an `id` and `path`, in daemon order.
    pub fn folders(&self) -> Vec<FolderConfig> {
        self.folders
            .iter()
            .filter_map(|entry| match FolderConfig::deserialize(entry) {
                Ok(folder) => Some(folder),
                Err(err) => {
                    debug!(error = %err, "Skipping folder entry without id or path");
                    None
                }
            })
            .collect()
    }
}

/// The subset of `/rest/db/status` this client reads.
#[derive(Debug, Default)]
pub struct FolderStatus {
    pub state: Option<String>,
}

impl FolderStatus {
    pub fn from_value(value: &Value) -> Self {
        Self {
            state: value
                .get("state")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncthingEvent {
    pub id: u64,
    #[serde(rename = "type", default, deserialize_with = "string_or_empty")]
    pub event_type: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Only `id` is required on an event; other fields of the wrong JSON type
/// read as absent so the cursor can still move past the event.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(|s| s.to_string()))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

impl SyncthingEvent {
    /// Parse an `/rest/events` body. Anything but an array is malformed;
    /// elements without a numeric id are dropped.
    pub fn parse_batch(value: Value) -> Result<Vec<SyncthingEvent>, MonitorError> {
        let Value::Array(items) = value else {
            return Err(MonitorError::malformed("events response is not an array"));
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<SyncthingEvent>(item) {
                Ok(event) => Some(event),
                Err(err) => {
                    debug!(error = %err, "Skipping event without numeric id");
                    None
                }
            })
            .collect())
    }

    pub fn folder_id(&self) -> Option<&str> {
        self.data.get("folder").and_then(|v| v.as_str())
    }

    /// `(folder, to)` for a well-formed `StateChanged` event.
    pub fn state_change(&self) -> Option<(&str, &str)> {
        if self.event_type != STATE_CHANGED {
            return None;
        }
        let folder = self.folder_id()?;
        let to = self.data.get("to").and_then(|v| v.as_str())?;
        Some((folder, to))
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.time.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}
