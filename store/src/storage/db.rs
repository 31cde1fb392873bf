//! # SledStore: Persistent Key-Value Backend
//!
//! The on-disk home of trie state, built on sled's embedded key-value
//! store. Keys are raw bytes (typically hex-prefix packed paths or node
//! hashes); values are opaque.
//!
//! ## Tree Layout
//!
//! All pairs live in one named sled tree (default `state`, see
//! [`config::DEFAULT_TREE_NAME`](crate::config::DEFAULT_TREE_NAME)). Other
//! trees in the same database are left alone, so one database can host
//! several independent stores.
//!
//! ## Atomicity
//!
//! [`KeyValueStore::write_batch`] goes through a single sled `Batch`. Either
//! every put and delete of a committed transaction lands, or none does.

use sled::{Batch, Db, Tree};
use std::path::Path;

use super::kv::{KeyValueStore, StoreResult, WriteBatch};
use crate::config::{StoreConfig, DEFAULT_TREE_NAME};

/// Persistent key/value store over one sled tree.
///
/// # Thread Safety
///
/// sled handles are cheap to clone and thread-safe. Clones of a
/// `SledStore` see the same data, so a reader can keep a handle while a
/// [`TrackingStore`](super::TrackingStore) owns another.
#[derive(Debug, Clone)]
pub struct SledStore {
    /// The underlying sled database handle.
    db: Db,
    /// The tree holding this store's pairs.
    tree: Tree,
}

impl SledStore {
    /// Open or create a database at the given filesystem path, using the
    /// default tree.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db, DEFAULT_TREE_NAME)
    }

    /// Create a temporary database that is removed when the last handle is
    /// dropped. No filesystem cleanup needed in tests.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, DEFAULT_TREE_NAME)
    }

    /// Open the store described by `config`.
    ///
    /// With `database_reset` set, the tree is cleared before it is handed
    /// out.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let db = if config.temporary {
            sled::Config::new().temporary(true).open()?
        } else {
            sled::open(&config.data_dir)?
        };
        let store = Self::from_db(db, &config.tree)?;

        if config.database_reset {
            let dropped = store.tree.len();
            store.tree.clear()?;
            store.db.flush()?;
            tracing::warn!(tree = %config.tree, dropped, "database reset on open");
        }

        tracing::info!(
            path = %config.data_dir.display(),
            tree = %config.tree,
            temporary = config.temporary,
            entries = store.tree.len(),
            "store opened"
        );
        Ok(store)
    }

    /// Use tree `name` from an already-open database.
    pub fn from_db(db: Db, name: &str) -> StoreResult<Self> {
        let tree = db.open_tree(name)?;
        Ok(Self { db, tree })
    }

    /// Number of pairs in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        self.tree.remove(key)?;
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        self.flush()
    }

    /// One sled `Batch`: atomic, puts then deletes.
    fn write_batch(&mut self, batch: WriteBatch) -> StoreResult<()> {
        let (puts, deletes) = batch.into_parts();
        let mut sled_batch = Batch::default();
        for (key, value) in puts {
            sled_batch.insert(key.as_bytes(), value);
        }
        // A later op on the same key wins inside a sled Batch.
        for key in deletes {
            sled_batch.remove(key.as_bytes());
        }
        self.tree.apply_batch(sled_batch)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_temporary_database() {
        let store = SledStore::open_temporary().expect("should create temp db");
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn open_persistent_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SledStore::open(dir.path()).expect("should open db");
        store.put(b"root", b"\x01\x02").unwrap();
        store.close().unwrap();
        drop(store);

        let reopened = SledStore::open(dir.path()).expect("should reopen db");
        assert_eq!(reopened.get(b"root").unwrap(), Some(vec![0x01, 0x02]));
    }

    #[test]
    fn put_get_delete() {
        let mut store = SledStore::open_temporary().unwrap();
        assert!(store.get(b"k").unwrap().is_none());

        store.put(b"k", b"v1").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v1".to_vec()));

        store.put(b"k", b"v2").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v2".to_vec()));

        store.delete(b"k").unwrap();
        assert!(store.get(b"k").unwrap().is_none());

        // Deleting again is harmless.
        store.delete(b"k").unwrap();
    }

    #[test]
    fn clones_share_the_tree() {
        let mut writer = SledStore::open_temporary().unwrap();
        let reader = writer.clone();
        writer.put(b"shared", b"yes").unwrap();
        assert_eq!(reader.get(b"shared").unwrap(), Some(b"yes".to_vec()));
    }

    #[test]
    fn write_batch_is_applied() {
        let mut store = SledStore::open_temporary().unwrap();
        store.put(b"stale", b"0").unwrap();

        let mut batch = WriteBatch::new();
        batch.put(b"a".as_slice(), b"1".to_vec());
        batch.put(b"b".as_slice(), b"2".to_vec());
        batch.delete(b"stale".as_slice());
        store.write_batch(batch).unwrap();

        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert!(store.get(b"stale").unwrap().is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn batch_delete_overrides_put_of_same_key() {
        let mut store = SledStore::open_temporary().unwrap();
        let mut batch = WriteBatch::new();
        batch.put(b"k".as_slice(), b"v".to_vec());
        batch.delete(b"k".as_slice());
        store.write_batch(batch).unwrap();
        assert!(store.get(b"k").unwrap().is_none());
    }

    #[test]
    fn trees_are_independent() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let mut accounts = SledStore::from_db(db.clone(), "accounts").unwrap();
        let storage = SledStore::from_db(db, "storage").unwrap();

        accounts.put(b"k", b"v").unwrap();
        assert!(storage.get(b"k").unwrap().is_none());
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn database_reset_clears_existing_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StoreConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let mut store = SledStore::from_config(&config).unwrap();
        store.put(b"old", b"state").unwrap();
        store.close().unwrap();
        drop(store);

        let kept = SledStore::from_config(&config).unwrap();
        assert_eq!(kept.len(), 1);
        drop(kept);

        let reset = SledStore::from_config(&StoreConfig {
            database_reset: true,
            ..config
        })
        .unwrap();
        assert!(reset.is_empty());
    }

    #[test]
    fn temporary_config_ignores_data_dir() {
        let store = SledStore::from_config(&StoreConfig::temporary()).unwrap();
        assert!(store.is_empty());
    }
}
