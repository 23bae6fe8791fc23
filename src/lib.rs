//! Mirrors a local Syncthing daemon's folder states by polling its REST API.
//!
//! [`SyncthingClient`] loads the folder list from the daemon configuration, then
//! long-polls the event log and reports changes through a [`FolderObserver`].

pub mod config;
pub mod syncthing_client;
pub mod types;

pub use config::Config;
pub use syncthing_client::{
    FolderObserver, FolderRecord, FolderState, SyncIndicator, SyncthingClient,
};
pub use types::MonitorError;
