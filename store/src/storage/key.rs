//! Byte-string keys with value semantics.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// An immutable byte string usable as a `HashMap`/`HashSet` key.
///
/// Two keys are equal when their bytes are equal, and the hash depends only
/// on the bytes. `Borrow<[u8]>` lets maps keyed by `ByteKey` be probed with
/// a plain slice, without allocating.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteKey(Box<[u8]>);

impl ByteKey {
    /// Copy `bytes` into a new key.
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0.into_vec()
    }
}

impl Borrow<[u8]> for ByteKey {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ByteKey {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for ByteKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl fmt::Display for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::{HashMap, HashSet};
    use std::hash::{Hash, Hasher};

    fn hash_of(key: &ByteKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_bytes_make_equal_keys() {
        let a = ByteKey::new(&[1, 2, 3]);
        let b = ByteKey::from(vec![1, 2, 3]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, ByteKey::new(&[1, 2, 4]));
    }

    #[test]
    fn distinct_instances_collapse_in_a_set() {
        let mut set = HashSet::new();
        set.insert(ByteKey::new(b"account"));
        set.insert(ByteKey::new(b"account"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn map_lookup_by_slice() {
        let mut map = HashMap::new();
        map.insert(ByteKey::new(b"k"), 7u32);
        assert_eq!(map.get(b"k".as_slice()), Some(&7));
        assert_eq!(map.get(b"missing".as_slice()), None);
    }

    #[test]
    fn display_is_lower_hex() {
        let key = ByteKey::new(&[0xde, 0xad, 0x01]);
        assert_eq!(key.to_string(), "dead01");
        assert_eq!(format!("{key:?}"), "ByteKey(dead01)");
    }

    #[test]
    fn empty_key_is_valid() {
        let key = ByteKey::new(&[]);
        assert!(key.is_empty());
        assert_eq!(key.len(), 0);
        assert_eq!(key.into_vec(), Vec::<u8>::new());
    }
}
