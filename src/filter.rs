//! Dimension filters narrowing a counter query.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::keys::UNIQUE_USER;

/// Optional date bucket and dimensions of a counter query.
///
/// Every field is optional:
///
/// - `date` selects the time bucket. It is ignored for
///   [`Granularity::Total`](crate::granularity::Granularity::Total).
/// - `user` narrows to one user. The reserved value `"unique"` reads the
///   unique-visitor bitmap instead of the scalar counter.
/// - `oid` narrows to one object id.
/// - `env` narrows to one environment; `"all"` is used when absent.
///
/// # Examples
///
/// ```rust
/// use tracker_reader::filter::CountFilter;
///
/// let filter = CountFilter::new()
///     .with_date("20240115")
///     .with_env("production")
///     .unique();
///
/// assert!(filter.is_unique());
/// assert_eq!(filter.env.as_deref(), Some("production"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CountFilter {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub date: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub user: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub oid: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub env: Option<String>,
}

impl CountFilter {
    /// Creates an empty filter: no date, all users, all objects, all environments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date bucket.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the date bucket containing `at` for the given granularity.
    ///
    /// Clears the date for [`Granularity::Total`](crate::granularity::Granularity::Total).
    #[cfg(feature = "chrono")]
    pub fn with_bucket(
        mut self,
        granularity: crate::granularity::Granularity,
        at: chrono::NaiveDateTime,
    ) -> Self {
        self.date = granularity.bucket(at);
        self
    }

    /// Narrows the query to one user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Selects the unique-visitor count.
    pub fn unique(self) -> Self {
        self.with_user(UNIQUE_USER)
    }

    /// Narrows the query to one object id.
    pub fn with_oid(mut self, oid: impl Into<String>) -> Self {
        self.oid = Some(oid.into());
        self
    }

    /// Narrows the query to one environment.
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Returns `true` if the query targets the unique-visitor bitmap.
    pub fn is_unique(&self) -> bool {
        self.user.as_deref() == Some(UNIQUE_USER)
    }

    /// Short human-readable description of the dimensions, used by observers.
    ///
    /// ```rust
    /// use tracker_reader::filter::CountFilter;
    ///
    /// assert_eq!(CountFilter::new().describe(), "env=all");
    /// assert_eq!(
    ///     CountFilter::new().unique().with_oid("7").describe(),
    ///     "user=unique oid=7 env=all"
    /// );
    /// ```
    pub fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(user) = &self.user {
            parts.push(format!("user={}", user));
        }
        if let Some(oid) = &self.oid {
            parts.push(format!("oid={}", oid));
        }
        parts.push(format!(
            "env={}",
            self.env.as_deref().unwrap_or(crate::keys::ALL_ENVS)
        ));
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let filter = CountFilter::new();
        assert!(filter.date.is_none());
        assert!(filter.user.is_none());
        assert!(filter.oid.is_none());
        assert!(filter.env.is_none());
        assert!(!filter.is_unique());
    }

    #[test]
    fn test_unique_is_reserved_user() {
        assert!(CountFilter::new().with_user("unique").is_unique());
        assert!(!CountFilter::new().with_user("Unique").is_unique());
        assert!(!CountFilter::new().with_user("u-123").is_unique());
    }

    #[test]
    fn test_builder_overrides() {
        let filter = CountFilter::new().with_env("dev").with_env("prod");
        assert_eq!(filter.env.as_deref(), Some("prod"));
    }

    #[test]
    fn test_describe_preserves_env() {
        let filter = CountFilter::new().with_user("u1").with_env("staging");
        assert_eq!(filter.describe(), "user=u1 env=staging");
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn test_with_bucket() {
        use crate::granularity::Granularity;
        use chrono::NaiveDate;

        let at = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();

        let filter = CountFilter::new().with_bucket(Granularity::Month, at);
        assert_eq!(filter.date.as_deref(), Some("202312"));

        let filter = filter.with_bucket(Granularity::Total, at);
        assert!(filter.date.is_none());
    }
}
