use std::sync::Arc;

use crate::config::Config;
use crate::types::MonitorError;

use super::api::{HttpTransport, LoadSummary, Transport};
use super::core::{ConfigurationLoader, EventStream, StreamPhase, StreamSettings};
use super::helpers::load_api_key;
use super::models::FolderRecord;
use super::notifier::FolderObserver;
use super::registry::{FolderRegistry, SharedRegistry};

/// Read-only mirror of a Syncthing daemon's folders.
pub struct SyncthingClient {
    base_url: String,
    registry: SharedRegistry,
    loader: ConfigurationLoader,
    stream: EventStream,
}

impl SyncthingClient {
    /// Resolve the API key and build an HTTP-backed client from configuration.
    pub async fn connect(
        config: &Config,
        observer: Arc<dyn FolderObserver>,
    ) -> Result<Self, MonitorError> {
        let api_key = load_api_key(config).await?;
        let transport =
            HttpTransport::new(config.api_base.as_str(), api_key, config.request_timeout())?;

        Ok(Self::new(
            config.api_base.clone(),
            Arc::new(transport),
            observer,
            StreamSettings::from_config(config),
        ))
    }

    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn FolderObserver>,
        settings: StreamSettings,
    ) -> Self {
        let registry = FolderRegistry::shared();
        let loader = ConfigurationLoader::new(
            Arc::clone(&transport),
            Arc::clone(&registry),
            Arc::clone(&observer),
        );
        let stream = EventStream::new(transport, Arc::clone(&registry), observer, settings);

        Self {
            base_url: base_url.into(),
            registry,
            loader,
            stream,
        }
    }

    /// Rebuild the folder list from the daemon configuration.
    pub async fn load_configuration(&self) -> Result<LoadSummary, MonitorError> {
        self.loader.load().await
    }

    /// Re-fetch one folder's state outside the event stream.
    pub async fn refresh_folder(&self, id: &str) -> Result<Option<FolderRecord>, MonitorError> {
        self.loader.refresh_folder(id).await
    }

    pub fn start_listening(&self) -> bool {
        self.stream.start()
    }

    pub fn stop_listening(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.stream.stop()
    }

    pub fn stream_phase(&self) -> StreamPhase {
        self.stream.phase()
    }

    pub fn cursor(&self) -> u64 {
        self.stream.cursor()
    }

    pub async fn folders(&self) -> Vec<FolderRecord> {
        self.registry.lock().await.all()
    }

    pub async fn folder(&self, id: &str) -> Option<FolderRecord> {
        self.registry.lock().await.get(id).cloned()
    }

    /// Address of the daemon's web UI.
    pub fn web_ui_url(&self) -> &str {
        &self.base_url
    }
}
