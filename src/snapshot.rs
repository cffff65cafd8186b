//! Point-in-time results of counter reads.
//!
//! A [`CountSnapshot`] pairs one counter value with everything that
//! identifies it (key, event, granularity, filter). A [`ReportSnapshot`]
//! groups several of them, typically one per granularity of the same event.
//! Both are what the [`observers`](crate::observers) render.
//!
//! # Feature Flag
//!
//! The types are always available; serde support requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! tracker-reader = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use tracker_reader::filter::CountFilter;
//! use tracker_reader::granularity::Granularity;
//! use tracker_reader::store::memory::MemoryStore;
//! use tracker_reader::CounterReader;
//!
//! let store = MemoryStore::new();
//! store.set("trk_42:signup:day:20240115:env:all:counts", "17");
//!
//! let reader = CounterReader::new(&store, 42).unwrap();
//! let filter = CountFilter::new().with_date("20240115");
//!
//! let report = reader
//!     .report("signup", &[Granularity::Day, Granularity::Total], &filter)
//!     .unwrap();
//!
//! assert_eq!(report.get(Granularity::Day).unwrap().value, 17);
//! assert_eq!(report.get(Granularity::Total).unwrap().value, 0);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::filter::CountFilter;
use crate::granularity::Granularity;

/// A single counter read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CountSnapshot {
    /// The storage key that was read.
    pub key: String,
    /// The event id (`"all"` for whole-app counters).
    pub event_id: String,
    /// The time-bucket resolution.
    pub granularity: Granularity,
    /// The filter as applied; `date` is cleared for `total` counters.
    pub filter: CountFilter,
    /// Whether the value is a unique-visitor bit count.
    pub unique: bool,
    /// The counter value.
    pub value: u64,
}

impl CountSnapshot {
    /// Returns the date bucket the value belongs to, if any.
    pub fn date(&self) -> Option<&str> {
        self.filter.date.as_deref()
    }

    /// Short label identifying the counter, e.g. `signup/day/20240115`.
    pub fn label(&self) -> String {
        match self.date() {
            Some(date) => format!("{}/{}/{}", self.event_id, self.granularity, date),
            None => format!("{}/{}", self.event_id, self.granularity),
        }
    }
}

/// A group of counter reads taken together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReportSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub timestamp_ms: Option<u64>,
    /// The individual reads, in request order.
    pub counts: Vec<CountSnapshot>,
}

impl ReportSnapshot {
    /// Creates a report from the given reads.
    pub fn new(counts: Vec<CountSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            counts,
        }
    }

    /// Creates a report from the given reads with a timestamp.
    pub fn with_timestamp(counts: Vec<CountSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            counts,
        }
    }

    /// Creates a report stamped with the current time.
    pub fn stamped(counts: Vec<CountSnapshot>) -> Self {
        Self::with_timestamp(counts, current_timestamp_ms())
    }

    /// Finds the first read of the given granularity.
    pub fn get(&self, granularity: Granularity) -> Option<&CountSnapshot> {
        self.counts.iter().find(|c| c.granularity == granularity)
    }

    /// Finds a read by storage key.
    pub fn get_key(&self, key: &str) -> Option<&CountSnapshot> {
        self.counts.iter().find(|c| c.key == key)
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
