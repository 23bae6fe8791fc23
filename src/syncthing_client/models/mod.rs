mod folder;

pub use folder::{FolderRecord, FolderState, SyncIndicator};
