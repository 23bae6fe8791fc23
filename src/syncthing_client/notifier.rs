use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::types::MonitorError;

use super::models::FolderRecord;

/// Receives folder updates from the core. Records are snapshots; holding on to
/// them never races with later updates.
pub trait FolderObserver: Send + Sync {
    fn on_folder_discovered(&self, folder: FolderRecord);

    fn on_folder_state_changed(&self, folder: FolderRecord);

    /// Failures the core recovered from or gave up on.
    fn on_error(&self, _error: &MonitorError) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum FolderEvent {
    Discovered(FolderRecord),
    StateChanged(FolderRecord),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderNotification {
    pub received_at: DateTime<Utc>,
    pub event: FolderEvent,
}

/// Forwards notifications over an unbounded channel.
#[derive(Clone)]
pub struct ChannelObserver {
    tx: UnboundedSender<FolderNotification>,
}

impl ChannelObserver {
    pub fn new() -> (Self, UnboundedReceiver<FolderNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: FolderEvent) {
        // Receiver gone means nobody is listening anymore.
        let _ = self.tx.send(FolderNotification {
            received_at: Utc::now(),
            event,
        });
    }
}

impl FolderObserver for ChannelObserver {
    fn on_folder_discovered(&self, folder: FolderRecord) {
        self.send(FolderEvent::Discovered(folder));
    }

    fn on_folder_state_changed(&self, folder: FolderRecord) {
        self.send(FolderEvent::StateChanged(folder));
    }

    fn on_error(&self, error: &MonitorError) {
        self.send(FolderEvent::Error(error.to_string()));
    }
}
