//! The key-value store capability a reader depends on.
//!
//! [`Store`] is deliberately narrow: it exposes exactly the four read
//! operations the counter layout needs. Two implementations ship with the
//! crate:
//!
//! | Store | Feature | Description |
//! |-------|---------|-------------|
//! | [`MemoryStore`](memory::MemoryStore) | always | In-memory fake with Redis semantics, for tests and fixtures |
//! | [`RedisStore`](redis::RedisStore) | `redis` | Synchronous Redis connection |
//!
//! `Store` is implemented for `&S`, `Box<S>` and `Arc<S>`, so several
//! readers (for different apps or namespaces) can share one store.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tracker_reader::store::memory::MemoryStore;
//! use tracker_reader::CounterReader;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.add_member("trk_shop:events", "checkout");
//! store.add_member("trk_blog:events", "comment");
//!
//! let shop = CounterReader::new(Arc::clone(&store), "shop").unwrap();
//! let blog = CounterReader::new(Arc::clone(&store), "blog").unwrap();
//!
//! assert!(shop.captured_events().unwrap().contains("checkout"));
//! assert!(blog.captured_events().unwrap().contains("comment"));
//! ```

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::StoreError;

/// Read operations required from the backing key-value store.
///
/// Absent keys are not errors: they read as an empty set, an empty map,
/// `None`, or a bit count of zero.
pub trait Store {
    /// Returns all members of the set at `key`.
    fn set_members(&self, key: &str) -> Result<HashSet<String>, StoreError>;

    /// Returns all field/value pairs of the hash at `key`.
    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Returns the raw string value at `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Returns the number of set bits in the value at `key`.
    fn bit_count(&self, key: &str) -> Result<u64, StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn set_members(&self, key: &str) -> Result<HashSet<String>, StoreError> {
        (**self).set_members(key)
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        (**self).hash_get_all(key)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        (**self).bit_count(key)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn set_members(&self, key: &str) -> Result<HashSet<String>, StoreError> {
        (**self).set_members(key)
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        (**self).hash_get_all(key)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        (**self).bit_count(key)
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn set_members(&self, key: &str) -> Result<HashSet<String>, StoreError> {
        (**self).set_members(key)
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        (**self).hash_get_all(key)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        (**self).bit_count(key)
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn count_via_dyn(store: &dyn Store, key: &str) -> u64 {
        store.bit_count(key).unwrap()
    }

    #[test]
    fn test_forwarding_impls() {
        let store = MemoryStore::new();
        store.set("k", "v");

        let boxed: Box<dyn Store> = Box::new(MemoryStore::new());
        assert_eq!(boxed.get("k").unwrap(), None);

        let shared = Arc::new(store);
        let by_ref = &shared;
        assert_eq!(by_ref.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(count_via_dyn(&shared, "k"), "v".as_bytes()[0].count_ones() as u64);
    }
}
