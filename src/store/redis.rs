//! Redis-backed store.
//!
//! # Feature Flag
//!
//! This module requires the `redis` feature:
//!
//! ```toml
//! [dependencies]
//! tracker-reader = { version = "0.1", features = ["redis"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tracker_reader::store::redis::RedisStore;
//! use tracker_reader::filter::CountFilter;
//! use tracker_reader::CounterReader;
//!
//! let store = RedisStore::open("redis://127.0.0.1/")?;
//! let reader = CounterReader::new(store, 42)?;
//! let signups = reader.event_day_counts("signup", &CountFilter::new().with_date("20240115"))?;
//! ```

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::Store;

/// A [`Store`] over one synchronous Redis connection.
///
/// Commands are serialized through a mutex, so a single `RedisStore` can be
/// shared (e.g. in an `Arc`) by several readers and threads. Reconnects and
/// retries are left to the caller.
pub struct RedisStore {
    conn: Mutex<::redis::Connection>,
}

impl RedisStore {
    /// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    ///
    /// An unparsable URL or an unreachable server is reported as
    /// [`StoreError::Redis`].
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = ::redis::Client::open(url)?;
        let conn = client.get_connection()?;
        tracing::debug!(url, "connected to redis");
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already established connection.
    pub fn from_connection(conn: ::redis::Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn query<T: ::redis::FromRedisValue>(
        &self,
        command: &'static str,
        key: &str,
    ) -> Result<T, StoreError> {
        tracing::trace!(command, key, "redis command");
        let mut conn = self.conn.lock();
        Ok(::redis::cmd(command).arg(key).query(&mut *conn)?)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl Store for RedisStore {
    fn set_members(&self, key: &str) -> Result<HashSet<String>, StoreError> {
        self.query("SMEMBERS", key)
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.query("HGETALL", key)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.query("GET", key)
    }

    fn bit_count(&self, key: &str) -> Result<u64, StoreError> {
        self.query("BITCOUNT", key)
    }
}
