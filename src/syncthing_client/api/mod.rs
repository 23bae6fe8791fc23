mod http;
mod queries;
mod responses;
mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::types::MonitorError;

pub use http::HttpTransport;
pub use queries::{EventStreamQuery, EventsQuery, FolderStatusQuery};
pub use responses::{BatchOutcome, LoadSummary};
pub use types::{FolderConfig, FolderStatus, SyncthingConfig, SyncthingEvent, STATE_CHANGED};

/// A single GET against the daemon's REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path below `/rest/`, e.g. `events`.
    pub path: String,
    /// Query parameters as a JSON object (`Value::Null` for none).
    pub query: Value,
    /// Overrides the transport's default request timeout.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into().trim_start_matches('/').to_string(),
            query: Value::Null,
            timeout: None,
        }
    }

    pub fn with_query<Q>(mut self, query: &Q) -> Result<Self, MonitorError>
    where
        Q: Serialize + ?Sized,
    {
        self.query = serde_json::to_value(query)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a query parameter rendered as a string.
    pub fn query_param(&self, key: &str) -> Option<String> {
        match self.query.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Read-only access to the daemon. Implementations perform exactly one request
/// per call and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: ApiRequest) -> Result<Value, MonitorError>;
}
