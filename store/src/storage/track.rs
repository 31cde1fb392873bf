//! # TrackingStore: Transactional Overlay
//!
//! Wraps any [`KeyValueStore`] and adds begin / commit / rollback.
//!
//! ## States
//!
//! ```text
//!        start_track             commit_track | rollback_track
//! Idle ──────────────► Tracking ─────────────────────────────► Idle
//! ```
//!
//! - **Idle**: every call passes straight through to the inner store.
//! - **Tracking**: puts and deletes are staged in memory. Reads see staged
//!   changes first (read-your-own-writes), then fall through to the inner
//!   store. The inner store is not touched until `commit_track`.
//!
//! ## Staging Rules
//!
//! Each key holds exactly one staged outcome: a pending put or a pending
//! delete. A put clears an earlier delete of the same key and a delete
//! clears an earlier put, so the last write to a key wins regardless of
//! the order in which commit flushes puts and deletes.
//!
//! ## Misuse
//!
//! Starting a transaction while one is open, or committing / rolling back
//! with none open, is a [`StoreError`] rather than a silent reset. Closing
//! with an open transaction discards it and logs a warning.

use std::collections::{HashMap, HashSet};

use super::key::ByteKey;
use super::kv::{KeyValueStore, StoreError, StoreResult, WriteBatch};

/// Mutations staged by one open transaction.
#[derive(Debug, Default)]
struct TrackBuffer {
    changes: HashMap<ByteKey, Vec<u8>>,
    deletes: HashSet<ByteKey>,
}

impl TrackBuffer {
    fn stage_put(&mut self, key: &[u8], value: &[u8]) {
        self.deletes.remove(key);
        self.changes.insert(ByteKey::new(key), value.to_vec());
    }

    fn stage_delete(&mut self, key: &[u8]) {
        self.changes.remove(key);
        self.deletes.insert(ByteKey::new(key));
    }

    fn into_batch(self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for (key, value) in self.changes {
            batch.put(key, value);
        }
        for key in self.deletes {
            batch.delete(key);
        }
        batch
    }
}

/// Transactional decorator over an inner store.
///
/// Single-writer: one block-processing pipeline drives a `TrackingStore`
/// at a time, and at most one transaction is open per instance.
#[derive(Debug)]
pub struct TrackingStore<S> {
    inner: S,
    /// `Some` while tracking.
    buffer: Option<TrackBuffer>,
}

impl<S: KeyValueStore> TrackingStore<S> {
    /// Wrap `inner`. The overlay starts idle.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: None,
        }
    }

    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyTracking`] if one is already open. The open
    /// transaction is left untouched.
    pub fn start_track(&mut self) -> StoreResult<()> {
        if self.buffer.is_some() {
            return Err(StoreError::AlreadyTracking);
        }
        self.buffer = Some(TrackBuffer::default());
        tracing::debug!("transaction started");
        Ok(())
    }

    /// Flush every staged put, then every staged delete, to the inner store
    /// and return to idle.
    ///
    /// The staged changes are consumed even when the flush fails; the
    /// overlay is idle afterwards either way. Whether a failed flush left
    /// the inner store partially updated depends on its `write_batch`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotTracking`] if no transaction is open, or whatever
    /// the inner store reports.
    pub fn commit_track(&mut self) -> StoreResult<()> {
        let buffer = self.buffer.take().ok_or(StoreError::NotTracking)?;
        let puts = buffer.changes.len();
        let deletes = buffer.deletes.len();

        if let Err(e) = self.inner.write_batch(buffer.into_batch()) {
            tracing::error!(puts, deletes, error = %e, "transaction commit failed");
            return Err(e);
        }
        tracing::debug!(puts, deletes, "transaction committed");
        Ok(())
    }

    /// Discard every staged change and return to idle. The inner store is
    /// not touched.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotTracking`] if no transaction is open.
    pub fn rollback_track(&mut self) -> StoreResult<()> {
        let buffer = self.buffer.take().ok_or(StoreError::NotTracking)?;
        tracing::debug!(
            puts = buffer.changes.len(),
            deletes = buffer.deletes.len(),
            "transaction rolled back"
        );
        Ok(())
    }

    pub fn is_tracking(&self) -> bool {
        self.buffer.is_some()
    }

    /// Number of staged puts. Zero when idle.
    pub fn pending_puts(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.changes.len())
    }

    /// Number of staged deletes. Zero when idle.
    pub fn pending_deletes(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.deletes.len())
    }

    /// The wrapped store, bypassing any staged changes.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner store. An open transaction is discarded.
    pub fn into_inner(mut self) -> S {
        self.abandon("overlay unwrapped");
        self.inner
    }

    fn abandon(&mut self, reason: &'static str) {
        if let Some(buffer) = self.buffer.take() {
            tracing::warn!(
                puts = buffer.changes.len(),
                deletes = buffer.deletes.len(),
                reason,
                "open transaction discarded"
            );
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for TrackingStore<S> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        match &mut self.buffer {
            Some(buffer) => {
                buffer.stage_put(key, value);
                Ok(())
            }
            None => self.inner.put(key, value),
        }
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if let Some(buffer) = &self.buffer {
            if buffer.deletes.contains(key) {
                return Ok(None);
            }
            if let Some(value) = buffer.changes.get(key) {
                return Ok(Some(value.clone()));
            }
        }
        self.inner.get(key)
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        match &mut self.buffer {
            Some(buffer) => {
                buffer.stage_delete(key);
                Ok(())
            }
            None => self.inner.delete(key),
        }
    }

    /// Always reaches the inner store. An open transaction is discarded,
    /// not reported as an error.
    fn close(&mut self) -> StoreResult<()> {
        self.abandon("store closed");
        self.inner.close()
    }

    fn write_batch(&mut self, batch: WriteBatch) -> StoreResult<()> {
        let Some(buffer) = &mut self.buffer else {
            return self.inner.write_batch(batch);
        };
        let (puts, deletes) = batch.into_parts();
        for (key, value) in puts {
            buffer.stage_put(key.as_bytes(), &value);
        }
        for key in deletes {
            buffer.stage_delete(key.as_bytes());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
