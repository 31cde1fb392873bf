//! # Storage Module
//!
//! Raw key/value persistence for trie state, plus the transactional overlay
//! that holds one block's worth of mutations in isolation.
//!
//! ## Architecture
//!
//! ```text
//! key.rs     - ByteKey, a byte string with value equality for map keys
//! kv.rs      - KeyValueStore contract, WriteBatch, StoreError
//! memory.rs  - In-memory store with shared handles
//! db.rs      - sled persistence
//! track.rs   - TrackingStore: begin / commit / rollback over any store
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! block processing ─► TrackingStore ─(commit_track)─► SledStore
//!                          │
//!                   (rollback_track)
//!                          ▼
//!                       dropped
//! ```
//!
//! ## Design Decisions
//!
//! 1. **One trait, many stores.** Backends and the overlay share the
//!    `KeyValueStore` contract, so the overlay is a drop-in wrapper and
//!    callers never care which one they hold.
//!
//! 2. **Commit is a batch.** The overlay hands its staged changes to the
//!    inner store as a single `WriteBatch`. sled applies it atomically;
//!    backends without batch support fall back to put-then-delete.
//!
//! 3. **Last write wins per key.** A put after a delete of the same key
//!    revives it, and a delete after a put removes it.

pub mod db;
pub mod key;
pub mod kv;
pub mod memory;
pub mod track;

pub use db::SledStore;
pub use key::ByteKey;
pub use kv::{KeyValueStore, StoreError, StoreResult, WriteBatch};
pub use memory::MemoryStore;
pub use track::TrackingStore;
