//! Time-bucket resolution of a counter.

use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The time-bucket resolution of a counter.
///
/// The lowercase name is the first segment after the event id in a counter
/// key. Every granularity except [`Granularity::Total`] is further narrowed
/// by a date bucket:
///
/// | Granularity | Date bucket |
/// |-------------|-------------|
/// | `hour`  | `YYYYMMDDHH` |
/// | `day`   | `YYYYMMDD` |
/// | `week`  | `YYYYWW` |
/// | `month` | `YYYYMM` |
/// | `year`  | `YYYY` |
/// | `total` | none |
///
/// # Examples
///
/// ```rust
/// use tracker_reader::granularity::Granularity;
///
/// let g: Granularity = "week".parse().unwrap();
/// assert_eq!(g, Granularity::Week);
/// assert_eq!(g.to_string(), "week");
/// assert!(!Granularity::Total.is_dated());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
    Year,
    Total,
}

impl Granularity {
    /// All granularities, finest first.
    pub const ALL: [Granularity; 6] = [
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
        Granularity::Total,
    ];

    /// Returns the literal used in storage keys.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
            Granularity::Total => "total",
        }
    }

    /// Returns `true` if counters of this granularity are date-bucketed.
    pub const fn is_dated(&self) -> bool {
        !matches!(self, Granularity::Total)
    }

    /// Returns the `chrono` format string of the date bucket, if any.
    ///
    /// Weeks are rendered as calendar year followed by the ISO week number.
    pub const fn date_format(&self) -> Option<&'static str> {
        match self {
            Granularity::Hour => Some("%Y%m%d%H"),
            Granularity::Day => Some("%Y%m%d"),
            Granularity::Week => Some("%Y%V"),
            Granularity::Month => Some("%Y%m"),
            Granularity::Year => Some("%Y"),
            Granularity::Total => None,
        }
    }

    /// Renders the date bucket containing `at`.
    ///
    /// Returns `None` for [`Granularity::Total`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use tracker_reader::granularity::Granularity;
    ///
    /// let at = NaiveDate::from_ymd_opt(2024, 1, 15)
    ///     .unwrap()
    ///     .and_hms_opt(9, 30, 0)
    ///     .unwrap();
    ///
    /// assert_eq!(Granularity::Hour.bucket(at).as_deref(), Some("2024011509"));
    /// assert_eq!(Granularity::Total.bucket(at), None);
    /// ```
    #[cfg(feature = "chrono")]
    pub fn bucket(&self, at: chrono::NaiveDateTime) -> Option<String> {
        self.date_format().map(|fmt| at.format(fmt).to_string())
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown granularity name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown granularity {0:?} (expected hour, day, week, month, year or total)")]
pub struct ParseGranularityError(String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseGranularityError(s.to_string()))
    }
}
