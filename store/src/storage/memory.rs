//! In-memory key/value store.
//!
//! Clones are handles onto the same map, the way sled handles share one
//! database. Hand one clone to a [`TrackingStore`](super::TrackingStore)
//! and keep another to look underneath it.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::key::ByteKey;
use super::kv::{KeyValueStore, StoreResult, WriteBatch};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<ByteKey, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.entries.write().insert(ByteKey::new(key), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        Ok(())
    }

    /// Applied under one write lock, so readers on other handles never see
    /// half a batch.
    fn write_batch(&mut self, batch: WriteBatch) -> StoreResult<()> {
        let (puts, deletes) = batch.into_parts();
        let mut entries = self.entries.write();
        for (key, value) in puts {
            entries.insert(key, value);
        }
        for key in deletes {
            entries.remove(&key);
        }
        Ok(())
    }
}
