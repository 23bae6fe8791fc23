use serde::Serialize;

use crate::syncthing_client::models::FolderRecord;

/// Result of one configuration load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Folders found in the daemon configuration.
    pub discovered: usize,
    /// Folders whose initial status fetch succeeded.
    pub resolved: usize,
}

/// Effect of applying one event batch to the registry.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Cursor after the batch; unchanged for an empty batch.
    pub cursor: u64,
    /// Snapshots of every folder whose state changed, in event order.
    pub changed: Vec<FolderRecord>,
    /// Events whose type this client does not handle.
    pub ignored: usize,
}
