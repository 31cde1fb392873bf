//! # Key-Value Store Contract
//!
//! The four operations every backend provides (put, get, delete, close)
//! plus an optional batched write. No transactional semantics are assumed
//! of a backend; [`TrackingStore`](super::TrackingStore) adds them.

use super::key::ByteKey;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// `start_track` was called while a transaction is already open.
    #[error("a transaction is already being tracked")]
    AlreadyTracking,

    /// `commit_track` or `rollback_track` was called with no open transaction.
    #[error("no transaction is being tracked")]
    NotTracking,
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// WriteBatch
// ---------------------------------------------------------------------------

/// An ordered set of mutations applied by [`KeyValueStore::write_batch`].
///
/// Puts are always applied before deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    puts: Vec<(ByteKey, Vec<u8>)>,
    deletes: Vec<ByteKey>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<ByteKey>, value: Vec<u8>) {
        self.puts.push((key.into(), value));
    }

    pub fn delete(&mut self, key: impl Into<ByteKey>) {
        self.deletes.push(key.into());
    }

    pub fn puts(&self) -> &[(ByteKey, Vec<u8>)] {
        &self.puts
    }

    pub fn deletes(&self) -> &[ByteKey] {
        &self.deletes
    }

    /// Total number of mutations.
    pub fn len(&self) -> usize {
        self.puts.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(ByteKey, Vec<u8>)>, Vec<ByteKey>) {
        (self.puts, self.deletes)
    }
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// A byte-keyed persistence engine.
///
/// Writes take `&mut self`: a store has a single logical writer (one
/// block-processing pipeline). Reads take `&self`.
pub trait KeyValueStore {
    /// Insert or overwrite `key`.
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Fetch the value for `key`, `None` if absent.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> StoreResult<()>;

    /// Release the store. Durable backends flush here.
    fn close(&mut self) -> StoreResult<()>;

    /// Apply every put in `batch`, then every delete.
    ///
    /// The default applies them one at a time and stops at the first error,
    /// which can leave the store partially updated. Backends that can apply
    /// a batch atomically should override this.
    fn write_batch(&mut self, batch: WriteBatch) -> StoreResult<()> {
        let (puts, deletes) = batch.into_parts();
        for (key, value) in puts {
            self.put(key.as_bytes(), &value)?;
        }
        for key in deletes {
            self.delete(key.as_bytes())?;
        }
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn close(&mut self) -> StoreResult<()> {
        (**self).close()
    }

    fn write_batch(&mut self, batch: WriteBatch) -> StoreResult<()> {
        (**self).write_batch(batch)
    }
}
