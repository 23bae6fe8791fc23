use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::models::{FolderRecord, FolderState};

/// Registry handle shared between the loader and the event stream.
pub type SharedRegistry = Arc<Mutex<FolderRegistry>>;

/// Folders keyed by id, iterated in first-insertion order.
#[derive(Debug, Default, Clone)]
pub struct FolderRegistry {
    records: Vec<FolderRecord>,
    index: HashMap<String, usize>,
}

impl FolderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn get(&self, id: &str) -> Option<&FolderRecord> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    /// Insert, or overwrite in place while keeping the original position.
    pub fn upsert(&mut self, record: FolderRecord) {
        match self.index.get(record.id()) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.index.insert(record.id().to_string(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Update a folder's state and return a snapshot, or `None` if the id is unknown.
    pub fn set_state(&mut self, id: &str, state: FolderState) -> Option<FolderRecord> {
        let idx = *self.index.get(id)?;
        let record = &mut self.records[idx];
        record.set_state(state);
        Some(record.clone())
    }

    pub fn all(&self) -> Vec<FolderRecord> {
        self.records.clone()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id())
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_in_place() {
        let mut registry = FolderRegistry::new();
        registry.upsert(FolderRecord::new("a", "/a"));
        registry.upsert(FolderRecord::new("b", "/b"));
        registry.upsert(FolderRecord::new("a", "/a2").with_state(FolderState::Idle));

        assert_eq!(registry.len(), 2);
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec!["a", "b"]);
        let a = registry.get("a").unwrap();
        assert_eq!(a.path(), "/a2");
        assert_eq!(a.state(), &FolderState::Idle);
    }

    #[test]
    fn set_state_on_unknown_id_is_a_no_op() {
        let mut registry = FolderRegistry::new();
        registry.upsert(FolderRecord::new("a", "/a"));

        assert!(registry.set_state("missing", FolderState::Syncing).is_none());
        assert_eq!(registry.all(), vec![FolderRecord::new("a", "/a")]);
    }

    #[test]
    fn set_state_returns_snapshot() {
        let mut registry = FolderRegistry::new();
        registry.upsert(FolderRecord::new("a", "/a"));

        let snapshot = registry.set_state("a", FolderState::Scanning).unwrap();
        registry.set_state("a", FolderState::Idle);

        assert_eq!(snapshot.state(), &FolderState::Scanning);
        assert_eq!(registry.get("a").unwrap().state(), &FolderState::Idle);
    }

    #[test]
    fn clear_resets_index() {
        let mut registry = FolderRegistry::new();
        registry.upsert(FolderRecord::new("a", "/a"));
        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.get("a").is_none());
        registry.upsert(FolderRecord::new("b", "/b"));
        assert_eq!(registry.get("b").unwrap().path(), "/b");
    }
}
