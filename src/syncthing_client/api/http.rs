use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::MonitorError;

use super::{ApiRequest, Transport};

/// reqwest-backed transport for a single Syncthing instance.
#[derive(Clone)]
pub struct HttpTransport {
    api_key: String,
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MonitorError> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(MonitorError::Http)?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/rest/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: ApiRequest) -> Result<Value, MonitorError> {
        let url = self.url_for(&request.path);
        debug!(%url, query = %request.query, "GET");

        let mut builder = self.http.get(url).header("X-API-Key", &self.api_key);
        if !request.query.is_null() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(MonitorError::Http)?;

        if !response.status().is_success() {
            return Err(MonitorError::Status {
                path: request.path,
                status: response.status(),
            });
        }

        response.json::<Value>().await.map_err(MonitorError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_rest_path() {
        let transport =
            HttpTransport::new("http://localhost:8384/", "key", Duration::from_secs(1)).unwrap();
        assert_eq!(
            transport.url_for("system/config"),
            "http://localhost:8384/rest/system/config"
        );
        assert_eq!(
            transport.url_for("/db/status"),
            "http://localhost:8384/rest/db/status"
        );
    }
}
