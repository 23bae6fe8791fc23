mod api;
mod client;
mod core;
mod helpers;
mod models;
mod notifier;
mod registry;

pub use api::{
    ApiRequest, BatchOutcome, EventStreamQuery, EventsQuery, FolderConfig, FolderStatus,
    FolderStatusQuery, HttpTransport, LoadSummary, SyncthingConfig, SyncthingEvent, Transport,
    STATE_CHANGED,
};
pub use client::SyncthingClient;
pub use self::core::{apply_batch, ConfigurationLoader, EventStream, StreamPhase, StreamSettings};
pub use helpers::load_api_key;
pub use models::{FolderRecord, FolderState, SyncIndicator};
pub use notifier::{ChannelObserver, FolderEvent, FolderNotification, FolderObserver};
pub use registry::{FolderRegistry, SharedRegistry};
