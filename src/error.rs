//! Error types for counter reads.
//!
//! All reader operations return the crate-wide [`Result`], whose error type
//! [`Error`] separates faults reported by the store ([`StoreError`]) from
//! problems with the data found there or with the reader's configuration.
//!
//! # Example
//!
//! ```rust
//! use tracker_reader::error::Error;
//! use tracker_reader::filter::CountFilter;
//! use tracker_reader::store::memory::MemoryStore;
//! use tracker_reader::CounterReader;
//!
//! let store = MemoryStore::new();
//! store.set("trk_42:signup:total:env:all:counts", "not-a-number");
//!
//! let reader = CounterReader::new(&store, 42).unwrap();
//! match reader.event_total_counts("signup", &CountFilter::new()) {
//!     Err(Error::Parse { key, value, .. }) => {
//!         assert_eq!(key, "trk_42:signup:total:env:all:counts");
//!         assert_eq!(value, "not-a-number");
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::num::ParseIntError;

use thiserror::Error;

/// Error type for all reader operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The store failed to answer the request.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A scalar counter exists but does not hold a non-negative integer.
    #[error("invalid counter value {value:?} at key {key}")]
    Parse {
        /// The key that was read.
        key: String,
        /// The raw value found at the key.
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The reader or its configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error reading a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding a TOML configuration.
    #[cfg(feature = "toml")]
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error reported by a [`Store`](crate::store::Store) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error from the Redis client (connectivity, protocol, type conversion).
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The key holds a value of a different type than the operation expects.
    #[error("wrong type at key {key}: expected {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
    },

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}
