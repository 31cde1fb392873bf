// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Trie Store: Storage Substrate for Merkle-Patricia State
//!
//! The bottom layer underneath a Modified Merkle-Patricia Trie: how trie
//! paths are laid out on disk, and how the raw key/value mutations produced
//! while processing one block are held back until the block is accepted.
//!
//! This crate does not know what a trie node is or how it is hashed. It
//! knows nibbles and bytes.
//!
//! ## Architecture
//!
//! - **encoding** - Hex-prefix ("compact") encoding of nibble paths. Bit-exact,
//!   because other implementations read the same bytes.
//! - **storage** - The `KeyValueStore` contract, an in-memory and a sled
//!   backend, and `TrackingStore`, the transactional overlay that makes a
//!   batch of puts and deletes all-or-nothing.
//! - **config** - Well-known constants and the store configuration value.
//!
//! ## Typical Flow
//!
//! ```text
//! path bytes ─► bin_to_nibbles ─► pack_nibbles ─► key
//!                                                  │
//!             start_track ─► put/get/delete ─► commit_track | rollback_track
//!                                                  │
//!                                            SledStore (disk)
//! ```

pub mod config;
pub mod encoding;
pub mod storage;

pub use encoding::{pack_nibbles, unpack_to_nibbles, EncodingError, TERMINATOR};
pub use storage::{ByteKey, KeyValueStore, MemoryStore, SledStore, StoreError, TrackingStore};
