use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::types::MonitorError;

use super::super::api::{
    ApiRequest, FolderStatus, FolderStatusQuery, LoadSummary, SyncthingConfig, Transport,
};
use super::super::models::{FolderRecord, FolderState};
use super::super::notifier::FolderObserver;
use super::super::registry::SharedRegistry;

/// Seeds the folder registry from the daemon configuration.
#[derive(Clone)]
pub struct ConfigurationLoader {
    transport: Arc<dyn Transport>,
    registry: SharedRegistry,
    observer: Arc<dyn FolderObserver>,
}

impl ConfigurationLoader {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: SharedRegistry,
        observer: Arc<dyn FolderObserver>,
    ) -> Self {
        Self {
            transport,
            registry,
            observer,
        }
    }

    /// Replace the registry contents with the daemon's folder list, then resolve
    /// every folder's initial state concurrently.
    /// The registry is left untouched if the configuration cannot be fetched.
    pub async fn load(&self) -> Result<LoadSummary, MonitorError> {
        let body = self.transport.get(ApiRequest::new("system/config")).await?;
        let config = SyncthingConfig::from_value(body)?;

        let discovered = {
            let mut registry = self.registry.lock().await;
            registry.clear();
            for folder in config.folders() {
                debug!(folder = %folder.id, label = ?folder.label, path = %folder.path, "Configured folder");
                registry.upsert(FolderRecord::new(folder.id, folder.path));
            }
            registry.all()
        };
        info!(folders = discovered.len(), "Loaded Syncthing configuration");

        let mut pending = JoinSet::new();
        for folder in discovered.iter().cloned() {
            let id = folder.id().to_string();
            self.observer.on_folder_discovered(folder);

            let loader = self.clone();
            pending.spawn(async move {
                let result = loader.refresh_folder(&id).await;
                (id, result)
            });
        }

        let mut resolved = 0;
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((_, Ok(Some(_)))) => resolved += 1,
                Ok((_, Ok(None))) => {}
                Ok((id, Err(err))) => {
                    warn!(folder = %id, error = ?err, "Failed to fetch folder status");
                    self.observer.on_error(&err);
                }
                Err(err) => warn!(error = %err, "Folder status task aborted"),
            }
        }

        Ok(LoadSummary {
            discovered: discovered.len(),
            resolved,
        })
    }

    /// Fetch one folder's status and record it. `Ok(None)` when the response
    /// carries no state or the folder is no longer registered.
    pub async fn refresh_folder(&self, id: &str) -> Result<Option<FolderRecord>, MonitorError> {
        let request = ApiRequest::new("db/status").with_query(&FolderStatusQuery { folder: id })?;
        let body = self.transport.get(request).await?;

        let Some(state) = FolderStatus::from_value(&body).state else {
            warn!(folder = %id, "Folder status response has no state");
            return Ok(None);
        };

        let updated = self
            .registry
            .lock()
            .await
            .set_state(id, FolderState::parse(&state));

        match updated {
            Some(folder) => {
                debug!(folder = %id, state = %folder.state(), "Resolved folder state");
                self.observer.on_folder_state_changed(folder.clone());
                Ok(Some(folder))
            }
            None => {
                debug!(folder = %id, "Dropping status for unregistered folder");
                Ok(None)
            }
        }
    }
}
