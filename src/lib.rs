//! # Tracker Reader - Typed Access to Time-Bucketed Event Counters
//!
//! A read-side library for event/analytics counters kept in Redis under a
//! hierarchical key-naming convention: app → event → time bucket → dimension.
//! Given an event, a granularity and an optional filter, it renders the
//! storage key and reads either a scalar counter or a unique-visitor bitmap.
//!
//! ## Key Layout
//!
//! ```text
//! trk_42:signup:day:20240115:user:unique:oid:7:env:prod:counts
//! └┬┘ └┬┘ └─┬──┘ └┬┘ └──┬───┘ └────┬────┘ └─┬─┘ └──┬───┘ └─┬──┘
//!  │   │    │     │     │          │        │      │       └ literal
//!  │   │    │     │     │          │        │      └ environment ("all" if unset)
//!  │   │    │     │     │          │        └ object id (omitted if unset)
//!  │   │    │     │     │          └ user (omitted if unset; "unique" = bitmap)
//!  │   │    │     │     └ date bucket (never present for "total")
//!  │   │    │     └ granularity
//!  │   │    └ event id ("all" = whole app)
//!  │   └ app id
//!  └ namespace
//! ```
//!
//! ## Counter Kinds
//!
//! | Filter user | Stored as | Read with | Result |
//! |-------------|-----------|-----------|--------|
//! | absent / any id | integer string | `GET` | event count (absent = 0) |
//! | `"unique"` | bitmap, one bit per user | `BITCOUNT` | distinct users |
//!
//! ## Quick Start
//!
//! ```rust
//! use tracker_reader::filter::CountFilter;
//! use tracker_reader::store::memory::MemoryStore;
//! use tracker_reader::CounterReader;
//!
//! let store = MemoryStore::new();
//! store.add_member("trk_42:events", "signup");
//! store.set("trk_42:signup:month:202401:env:all:counts", "250");
//! store.set("trk_42:all:total:env:all:counts", "9000");
//!
//! let reader = CounterReader::new(&store, 42).unwrap();
//!
//! for event in reader.captured_events().unwrap() {
//!     let month = CountFilter::new().with_date("202401");
//!     println!("{}: {}", event, reader.event_month_counts(&event, &month).unwrap());
//! }
//!
//! assert_eq!(reader.app_total_counts(&CountFilter::new()).unwrap(), 9000);
//! ```
//!
//! ## Stores
//!
//! The reader is generic over the [`Store`](store::Store) trait, which
//! exposes exactly four reads (set members, hash get-all, get, bit count).
//! [`MemoryStore`](store::memory::MemoryStore) is an in-memory fake for tests;
//! [`RedisStore`](store::redis::RedisStore) talks to a server.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `redis` | [`store::redis::RedisStore`] over the `redis` crate |
//! | `serde` | Serialize/deserialize filters, snapshots and config |
//! | `json` | [`observers::json`] |
//! | `table` | [`observers::table`] |
//! | `toml` | Load [`config::ReaderConfig`] from TOML |
//! | `chrono` | Render date buckets from timestamps |
//! | `full` | All of the above |
//!
//! ## Logging
//!
//! Reads are traced with the `tracing` crate at `debug` level (key and
//! retrieval mode). The library never installs a subscriber.

pub mod config;
pub mod error;
pub mod filter;
pub mod granularity;
pub mod keys;
pub mod observers;
pub mod reader;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
pub use reader::CounterReader;
