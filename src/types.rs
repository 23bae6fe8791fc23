use thiserror::Error;

/// Errors surfaced by the Syncthing monitor core.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path} returned {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syncthing API key not found")]
    MissingApiKey,
}

impl MonitorError {
    /// True for network failures and non-success HTTP statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, MonitorError::Http(_) | MonitorError::Status { .. })
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        MonitorError::MalformedResponse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_errors() {
        let status = MonitorError::Status {
            path: "/rest/events".to_string(),
            status: reqwest::StatusCode::FORBIDDEN,
        };
        assert!(status.is_transport());
        assert_eq!(status.to_string(), "/rest/events returned 403 Forbidden");

        assert!(!MonitorError::malformed("no folders").is_transport());
        assert!(!MonitorError::MissingApiKey.is_transport());
    }
}
