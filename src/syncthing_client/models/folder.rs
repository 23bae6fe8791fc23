use std::fmt;

use serde::{Serialize, Serializer};

/// Folder state as reported by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FolderState {
    #[default]
    Unknown,
    Idle,
    Scanning,
    Syncing,
    Cleaning,
    /// A state string this client has no name for, kept verbatim.
    Other(String),
}

impl FolderState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "unknown" => FolderState::Unknown,
            "idle" => FolderState::Idle,
            "scanning" => FolderState::Scanning,
            "syncing" => FolderState::Syncing,
            "cleaning" => FolderState::Cleaning,
            other => FolderState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FolderState::Unknown => "unknown",
            FolderState::Idle => "idle",
            FolderState::Scanning => "scanning",
            FolderState::Syncing => "syncing",
            FolderState::Cleaning => "cleaning",
            FolderState::Other(raw) => raw,
        }
    }

    /// Coarse grouping used for the status icon.
    pub fn indicator(&self) -> SyncIndicator {
        match self {
            FolderState::Idle => SyncIndicator::InSync,
            FolderState::Scanning | FolderState::Syncing | FolderState::Cleaning => {
                SyncIndicator::Busy
            }
            FolderState::Unknown | FolderState::Other(_) => SyncIndicator::Unknown,
        }
    }
}

impl fmt::Display for FolderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FolderState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncIndicator {
    InSync,
    Busy,
    Unknown,
}

/// A folder tracked by the daemon. Only `state` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderRecord {
    id: String,
    path: String,
    state: FolderState,
}

impl FolderRecord {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            state: FolderState::Unknown,
        }
    }

    pub fn with_state(mut self, state: FolderState) -> Self {
        self.state = state;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> &FolderState {
        &self.state
    }

    pub fn set_state(&mut self, state: FolderState) {
        self.state = state;
    }
}
