//! In-memory store with Redis read semantics.
//!
//! [`MemoryStore`] keeps strings (as raw bytes), sets and hashes in a
//! `parking_lot::RwLock`-guarded map. Reads behave like the corresponding
//! Redis commands, including `WRONGTYPE` failures, so reader logic can be
//! tested without a server. The write helpers exist only to seed fixtures.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::Store;

#[derive(Debug, Clone)]
enum Entry {
    Bytes(Vec<u8>),
    Set(HashSet<String>),
    Hash(HashMap<String, String>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Bytes(_) => "string",
            Entry::Set(_) => "set",
            Entry::Hash(_) => "hash",
        }
    }
}

/// An in-memory [`Store`].
///
/// # Examples
///
/// ```rust
/// use tracker_reader::store::memory::MemoryStore;
/// use tracker_reader::store::Store;
///
/// let store = MemoryStore::new();
/// store.set("visits", "12");
/// store.set_bit("uniques", 3, true);
/// store.set_bit("uniques", 9, true);
///
/// assert_eq!(store.get("visits").unwrap().as_deref(), Some("12"));
/// assert_eq!(store.bit_count("uniques").unwrap(), 2);
/// assert_eq!(store.bit_count("missing").unwrap(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a string value, replacing whatever was at `key` (`SET`).
    pub fn set(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries
            .write()
            .insert(key.into(), Entry::Bytes(value.into()));
    }

    /// Sets or clears one bit of a string value (`SETBIT`).
    ///
    /// Bit 0 is the most significant bit of the first byte. The value grows
    /// with zero bytes as needed. A non-string value at `key` is replaced.
    pub fn set_bit(&self, key: impl Into<String>, offset: usize, bit: bool) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.into())
            .or_insert_with(|| Entry::Bytes(Vec::new()));
        if !matches!(entry, Entry::Bytes(_)) {
            *entry = Entry::Bytes(Vec::new());
        }
        if let Entry::Bytes(bytes) = entry {
            let byte = offset / 8;
            if bytes.len() <= byte {
                bytes.resize(byte + 1, 0);
            }
            let mask = 0x80u8 >> (offset % 8);
            if bit {
                bytes[byte] |= mask;
            } else {
                bytes[byte] &= !mask;
            }
        }
    }

    /// Adds a member to the set at `key` (`SADD`).
    pub fn add_member(&self, key: impl Into<String>, member: impl Into<String>) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.into())
            .or_insert_with(|| Entry::Set(HashSet::new()));
        if !matches!(entry, Entry::Set(_)) {
            *entry = Entry::Set(HashSet::new());
        }
        if let Entry::Set(set) = entry {
            set.insert(member.into());
        }
    }

    /// Sets a field of the hash at `key` (`HSET`).
    pub fn set_field(
        &self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.into())
            .or_insert_with(|| Entry::Hash(HashMap::new()));
        if !matches!(entry, Entry::Hash(_)) {
            *entry = Entry::Hash(HashMap::new());
        }
        if let Entry::Hash(hash) = entry {
            hash.insert(field.into(), value.into());
        }
    }

    /// Removes a key. Returns `true` if it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Entry) -> StoreError {
    tracing::debug!(key, expected, found = found.kind(), "wrong type");
    StoreError::WrongType {
        key: key.to_string(),
        expected,
    }
}

impl Store for MemoryStore {
    fn set_members(&self, key: &str) -> Result<HashSet<String>, StoreError> {
        match self.entries.read().get(key) {
            None => Ok(HashSet::new()),
            Some(Entry::Set(set)) => Ok(set.clone()),
            Some(other) => Err(wrong_type(key, "set", other)),
        }
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        match self.entries.read().get(key) {
            None => Ok(HashMap::new()),
            Some(Entry::Hash(hash)) => Ok(hash.clone()),
            Some(other) => Err(wrong_type(key, "hash", other)),
        }
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entries.read().get(key) {
            None => Ok(None),
            Some(Entry::Bytes(bytes)) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|_| StoreError::Backend(format!("value at key {} is not valid UTF-8", key))),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }

    fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        match self.entries.read().get(key) {
            None => Ok(0),
            Some(Entry::Bytes(bytes)) => Ok(bytes.iter().map(|b| b.count_ones() as u64).sum()),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }
}
