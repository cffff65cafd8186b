//! Renderers for counter snapshots.
//!
//! Observers turn [`CountSnapshot`](crate::snapshot::CountSnapshot)s read by
//! a [`CounterReader`](crate::CounterReader) into something a person or
//! another program can consume:
//!
//! - [`table`] - Pretty-print snapshots as tables using the `tabled` crate
//! - [`json`] - Serialize snapshots to JSON
//!
//! # Feature Flags
//!
//! Each observer is gated behind a feature flag to minimize dependencies:
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust,ignore
//! use tracker_reader::granularity::Granularity;
//! use tracker_reader::observers::table::TableObserver;
//!
//! let report = reader.report("signup", &Granularity::ALL, &filter)?;
//! println!("{}", TableObserver::new().render(&report.counts));
//! ```

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
