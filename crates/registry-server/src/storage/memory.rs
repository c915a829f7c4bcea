//! In-memory storage backend
//!
//! Default storage implementation keeping serialized records in an ordered
//! map. Suitable for development, tests, and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use registry_core::Application;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::RwLock;
use tracing::debug;

use super::{IndexField, RawEntry, RawIter, RecordStore, StoreError};

/// In-memory record store
///
/// Iterators snapshot the map under the read lock, so a cursor never
/// observes writes made after its query started.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<String, String>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key = %key, "saving record");
        self.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let removed = self.write().remove(key).is_some();
        if removed {
            debug!(key = %key, "deleted record");
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Box<dyn RawIter>, StoreError> {
        let entries: VecDeque<RawEntry> = self
            .read()
            .iter()
            .map(|(k, v)| RawEntry::Document {
                key: k.clone(),
                value: v.clone(),
            })
            .collect();
        Ok(Box::new(SnapshotIter::new(entries)))
    }

    async fn search(&self, field: IndexField, value: &str) -> Result<Box<dyn RawIter>, StoreError> {
        // The index engine decodes documents to evaluate its predicate, so
        // this path yields typed records and fails on a corrupt document.
        let mut entries = VecDeque::new();
        for (key, doc) in self.read().iter() {
            let app: Application =
                serde_json::from_str(doc).map_err(|e| StoreError::Corrupt {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            let matches = match field {
                IndexField::CreatedBy => app.info.created_by == value,
            };
            if matches {
                entries.push_back(RawEntry::Record(app));
            }
        }
        Ok(Box::new(SnapshotIter::new(entries)))
    }
}

/// Raw iterator over a snapshot of store entries
struct SnapshotIter {
    entries: VecDeque<RawEntry>,
    closed: bool,
}

impl SnapshotIter {
    fn new(entries: VecDeque<RawEntry>) -> Self {
        Self {
            entries,
            closed: false,
        }
    }
}

impl RawIter for SnapshotIter {
    fn has_next(&mut self) -> bool {
        !self.closed && !self.entries.is_empty()
    }

    fn next(&mut self) -> Result<RawEntry, StoreError> {
        if self.closed {
            return Err(StoreError::CursorClosed);
        }
        self.entries
            .pop_front()
            .ok_or_else(|| StoreError::Backend("iterator exhausted".into()))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        self.entries.clear();
        Ok(())
    }
}
