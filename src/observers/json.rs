//! JSON observer for serializing counter snapshots.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! tracker-reader = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use tracker_reader::filter::CountFilter;
//! use tracker_reader::granularity::Granularity;
//! use tracker_reader::observers::json::JsonObserver;
//! use tracker_reader::store::memory::MemoryStore;
//! use tracker_reader::CounterReader;
//!
//! let store = MemoryStore::new();
//! store.set("trk_42:signup:total:env:all:counts", "9");
//!
//! let reader = CounterReader::new(&store, 42).unwrap();
//! let report = reader
//!     .report("signup", &[Granularity::Total], &CountFilter::new())
//!     .unwrap();
//!
//! let json = JsonObserver::new().to_json(&report.counts).unwrap();
//! assert!(json.contains("\"value\":9"));
//! ```

use crate::snapshot::{CountSnapshot, ReportSnapshot};

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to include a timestamp in the output.
    pub include_timestamp: bool,
    /// Whether to wrap the snapshots in a [`ReportSnapshot`] object.
    pub wrap_in_report: bool,
}

/// An observer that serializes counter snapshots to JSON.
///
/// By default the output is a compact JSON array of snapshots. With
/// [`wrap_in_report`](JsonObserver::wrap_in_report) it is an object with a
/// `counts` array and, optionally, a `timestamp_ms` field.
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    ///
    /// Only has effect when `wrap_in_report` is also enabled.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Enables or disables wrapping the output in a [`ReportSnapshot`].
    pub fn wrap_in_report(mut self, enabled: bool) -> Self {
        self.config.wrap_in_report = enabled;
        self
    }

    fn serialize<T: serde::Serialize>(&self, value: &T) -> Result<String, serde_json::Error> {
        if self.config.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    /// Serializes snapshots to a JSON string.
    pub fn to_json(&self, snapshots: &[CountSnapshot]) -> Result<String, serde_json::Error> {
        if !self.config.wrap_in_report {
            return self.serialize(&snapshots);
        }

        let report = if self.config.include_timestamp {
            ReportSnapshot::stamped(snapshots.to_vec())
        } else {
            ReportSnapshot::new(snapshots.to_vec())
        };
        self.serialize(&report)
    }

    /// Serializes a report, keeping its own timestamp.
    pub fn report_to_json(&self, report: &ReportSnapshot) -> Result<String, serde_json::Error> {
        self.serialize(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CountFilter;
    use crate::granularity::Granularity;

    fn snapshot(value: u64) -> CountSnapshot {
        CountSnapshot {
            key: "trk_1:all:week:202403:env:all:counts".to_string(),
            event_id: "all".to_string(),
            granularity: Granularity::Week,
            filter: CountFilter::new().with_date("202403"),
            unique: false,
            value,
        }
    }

    #[test]
    fn test_to_json_empty() {
        assert_eq!(JsonObserver::new().to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_to_json_array() {
        let json = JsonObserver::new().to_json(&[snapshot(3), snapshot(4)]).unwrap();
        let parsed: Vec<CountSnapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].value, 4);
        assert_eq!(parsed[0].granularity, Granularity::Week);
    }

    #[test]
    fn test_pretty() {
        let json = JsonObserver::new().pretty(true).to_json(&[snapshot(1)]).unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_wrap_without_timestamp() {
        let json = JsonObserver::new()
            .wrap_in_report(true)
            .to_json(&[snapshot(1)])
            .unwrap();
        assert!(json.contains("\"counts\""));
        assert!(!json.contains("timestamp_ms"));
    }

    #[test]
    fn test_wrap_with_timestamp() {
        let json = JsonObserver::new()
            .wrap_in_report(true)
            .include_timestamp(true)
            .to_json(&[snapshot(1)])
            .unwrap();
        let report: ReportSnapshot = serde_json::from_str(&json).unwrap();
        assert!(report.timestamp_ms.is_some());
        assert_eq!(report.counts.len(), 1);
    }

    #[test]
    fn test_report_to_json_keeps_timestamp() {
        let report = ReportSnapshot::with_timestamp(vec![snapshot(2)], 1234567890);
        let json = JsonObserver::new().report_to_json(&report).unwrap();
        assert!(json.contains("1234567890"));
    }
}
