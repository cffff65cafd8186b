//! The counter reader.
//!
//! [`CounterReader`] turns a query (event, granularity, filter) into a
//! storage key and reads it from a [`Store`]. Two retrieval modes exist:
//!
//! - **Scalar**: the key holds an integer counter (`GET`). A missing key
//!   counts as zero; anything that is not a non-negative integer is an
//!   [`Error::Parse`].
//! - **Bit count**: when the filter's user is `"unique"`, the key holds one
//!   bit per distinct user and the population count (`BITCOUNT`) is the
//!   number of unique users.
//!
//! ```text
//!   event, granularity, filter
//!              │
//!              ▼
//!   {ns}_{app}:{event}:{granularity}[:{date}][:user:{user}][:oid:{oid}]:env:{env|all}:counts
//!              │
//!      user == "unique" ?
//!        │            │
//!       yes           no
//!        ▼            ▼
//!    BITCOUNT        GET ──► parse u64 (absent = 0)
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};

use tracing::debug;

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::filter::CountFilter;
use crate::granularity::Granularity;
use crate::keys::{KeyBuilder, ALL_ENVS, ALL_EVENTS, COUNTS, DEFAULT_NAMESPACE, ENV, OID, USER};
use crate::snapshot::{CountSnapshot, ReportSnapshot};
use crate::store::Store;

/// How the value at a counter key is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retrieval {
    /// An integer counter read with `GET`.
    Scalar,
    /// A bitmap whose set bits are counted with `BITCOUNT`.
    BitCount,
}

impl Display for Retrieval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retrieval::Scalar => f.write_str("scalar"),
            Retrieval::BitCount => f.write_str("bitcount"),
        }
    }
}

/// A rendered counter key together with its retrieval mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountKey {
    pub key: String,
    pub retrieval: Retrieval,
}

/// Read-only accessor for the counters of one application.
///
/// The reader is immutable after construction and holds no state besides
/// the store handle and the key prefix, so it is `Send + Sync` whenever the
/// store is.
///
/// # Examples
///
/// ```rust
/// use tracker_reader::filter::CountFilter;
/// use tracker_reader::store::memory::MemoryStore;
/// use tracker_reader::CounterReader;
///
/// let store = MemoryStore::new();
/// store.set("trk_42:signup:day:20240115:env:all:counts", "31");
/// store.set_bit("trk_42:signup:day:20240115:user:unique:env:all:counts", 5, true);
/// store.set_bit("trk_42:signup:day:20240115:user:unique:env:all:counts", 8, true);
///
/// let reader = CounterReader::new(&store, 42).unwrap();
/// let day = CountFilter::new().with_date("20240115");
///
/// assert_eq!(reader.event_day_counts("signup", &day).unwrap(), 31);
/// assert_eq!(reader.event_day_counts("signup", &day.clone().unique()).unwrap(), 2);
/// assert_eq!(reader.event_day_counts("login", &day).unwrap(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct CounterReader<S> {
    store: S,
    keys: KeyBuilder,
}

impl<S> CounterReader<S> {
    /// Creates a reader for `app_id` in the default `trk` namespace.
    ///
    /// Fails with [`Error::Config`] if the app id renders as an empty string.
    pub fn new(store: S, app_id: impl ToString) -> Result<Self> {
        Self::with_namespace(store, app_id, DEFAULT_NAMESPACE)
    }

    /// Creates a reader for `app_id` in a custom namespace.
    pub fn with_namespace(
        store: S,
        app_id: impl ToString,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let app_id = app_id.to_string();
        let namespace = namespace.into();
        if app_id.is_empty() {
            return Err(Error::Config("app id must not be empty".to_string()));
        }
        if namespace.is_empty() {
            return Err(Error::Config("namespace must not be empty".to_string()));
        }
        Ok(Self {
            store,
            keys: KeyBuilder::new(namespace, app_id),
        })
    }

    /// Creates a reader from a validated configuration.
    pub fn from_config(store: S, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        Self::with_namespace(store, &config.app_id, config.namespace.as_str())
    }

    /// Returns the namespace prefix.
    pub fn namespace(&self) -> &str {
        self.keys.namespace()
    }

    /// Returns the application id.
    pub fn app_id(&self) -> &str {
        self.keys.app_id()
    }

    /// Returns the key builder used by this reader.
    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the reader and returns the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Renders the key a count query reads and decides how to read it.
    ///
    /// Does not touch the store.
    ///
    /// ```rust
    /// use tracker_reader::filter::CountFilter;
    /// use tracker_reader::granularity::Granularity;
    /// use tracker_reader::reader::Retrieval;
    /// use tracker_reader::store::memory::MemoryStore;
    /// use tracker_reader::CounterReader;
    ///
    /// let reader = CounterReader::new(MemoryStore::new(), 42).unwrap();
    /// let filter = CountFilter::new().with_date("20240115").unique();
    /// let key = reader.count_key("signup", Granularity::Day, &filter);
    ///
    /// assert_eq!(key.key, "trk_42:signup:day:20240115:user:unique:env:all:counts");
    /// assert_eq!(key.retrieval, Retrieval::BitCount);
    /// ```
    pub fn count_key(
        &self,
        event_id: &str,
        granularity: Granularity,
        filter: &CountFilter,
    ) -> CountKey {
        let time = match filter.date.as_deref() {
            Some(date) if granularity.is_dated() => format!("{}:{}", granularity, date),
            _ => granularity.as_str().to_string(),
        };
        let user = filter.user.as_deref().map(|u| format!("{}:{}", USER, u));
        let oid = filter.oid.as_deref().map(|o| format!("{}:{}", OID, o));
        let env = format!("{}:{}", ENV, filter.env.as_deref().unwrap_or(ALL_ENVS));

        let mut segments: Vec<&str> = Vec::with_capacity(5);
        segments.push(&time);
        segments.extend(user.as_deref());
        segments.extend(oid.as_deref());
        segments.push(&env);
        segments.push(COUNTS);

        let retrieval = if filter.is_unique() {
            Retrieval::BitCount
        } else {
            Retrieval::Scalar
        };

        CountKey {
            key: self.keys.build(&segments, Some(event_id)),
            retrieval,
        }
    }
}

/// Generates the per-event and whole-app accessors of one granularity.
macro_rules! granularity_counts {
    ($($granularity:ident => $event_fn:ident, $app_fn:ident;)*) => {
        $(
            #[doc = concat!("Reads an event's `", stringify!($granularity), "` counter.")]
            pub fn $event_fn(&self, event_id: &str, filter: &CountFilter) -> Result<u64> {
                self.resolve_count(event_id, Granularity::$granularity, filter)
            }

            #[doc = concat!("Reads the whole app's `", stringify!($granularity), "` counter.")]
            pub fn $app_fn(&self, filter: &CountFilter) -> Result<u64> {
                self.$event_fn(ALL_EVENTS, filter)
            }
        )*
    };
}

impl<S: Store> CounterReader<S> {
    /// Reads one counter.
    ///
    /// The date of `filter` is ignored for [`Granularity::Total`]. Store
    /// failures are returned as [`Error::Store`]; nothing is retried.
    pub fn resolve_count(
        &self,
        event_id: &str,
        granularity: Granularity,
        filter: &CountFilter,
    ) -> Result<u64> {
        let CountKey { key, retrieval } = self.count_key(event_id, granularity, filter);
        self.fetch(&key, retrieval)
    }

    fn fetch(&self, key: &str, retrieval: Retrieval) -> Result<u64> {
        debug!(key, %retrieval, "reading counter");
        match retrieval {
            Retrieval::BitCount => Ok(self.store.bit_count(key)?),
            Retrieval::Scalar => match self.store.get(key)? {
                None => Ok(0),
                Some(value) => value.parse::<u64>().map_err(|source| Error::Parse {
                    key: key.to_string(),
                    value,
                    source,
                }),
            },
        }
    }

    granularity_counts! {
        Hour => event_hour_counts, app_hour_counts;
        Day => event_day_counts, app_day_counts;
        Week => event_week_counts, app_week_counts;
        Month => event_month_counts, app_month_counts;
        Year => event_year_counts, app_year_counts;
    }

    /// Reads an event's all-time counter. Any date in `filter` is ignored.
    pub fn event_total_counts(&self, event_id: &str, filter: &CountFilter) -> Result<u64> {
        self.resolve_count(event_id, Granularity::Total, filter)
    }

    /// Reads the whole app's all-time counter. Any date in `filter` is ignored.
    pub fn app_total_counts(&self, filter: &CountFilter) -> Result<u64> {
        self.event_total_counts(ALL_EVENTS, filter)
    }

    /// Returns the ids of all events captured for this app.
    pub fn captured_events(&self) -> Result<HashSet<String>> {
        let key = self.keys.events();
        debug!(key = %key, "reading captured events");
        Ok(self.store.set_members(&key)?)
    }

    /// Returns the object ids recorded for an event.
    pub fn event_objects(&self, event_id: &str) -> Result<HashMap<String, String>> {
        let key = self.keys.event_objects(event_id);
        debug!(key = %key, "reading event objects");
        Ok(self.store.hash_get_all(&key)?)
    }

    /// Returns the environments recorded for an event.
    pub fn event_envs(&self, event_id: &str) -> Result<HashMap<String, String>> {
        let key = self.keys.event_envs(event_id);
        debug!(key = %key, "reading event envs");
        Ok(self.store.hash_get_all(&key)?)
    }

    /// Reads one counter together with the metadata identifying it.
    pub fn snapshot(
        &self,
        event_id: &str,
        granularity: Granularity,
        filter: &CountFilter,
    ) -> Result<CountSnapshot> {
        let CountKey { key, retrieval } = self.count_key(event_id, granularity, filter);
        let value = self.fetch(&key, retrieval)?;

        let mut filter = filter.clone();
        if !granularity.is_dated() {
            filter.date = None;
        }

        Ok(CountSnapshot {
            key,
            event_id: event_id.to_string(),
            granularity,
            filter,
            unique: retrieval == Retrieval::BitCount,
            value,
        })
    }

    /// Reads one counter per granularity, in order.
    ///
    /// The values are reported side by side, never summed.
    pub fn report(
        &self,
        event_id: &str,
        granularities: &[Granularity],
        filter: &CountFilter,
    ) -> Result<ReportSnapshot> {
        let counts = granularities
            .iter()
            .map(|g| self.snapshot(event_id, *g, filter))
            .collect::<Result<Vec<_>>>()?;
        Ok(ReportSnapshot::new(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::memory::MemoryStore;
    use parking_lot::Mutex;

    /// Store wrapper logging every operation it serves.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingStore {
        fn record(&self, op: &'static str, key: &str) {
            self.calls.lock().push((op, key.to_string()));
        }

        fn calls(&self) -> Vec<(&'static str, String)> {
            self.calls.lock().clone()
        }
    }

    impl Store for RecordingStore {
        fn set_members(&self, key: &str) -> std::result::Result<HashSet<String>, StoreError> {
            self.record("set_members", key);
            self.inner.set_members(key)
        }

        fn hash_get_all(
            &self,
            key: &str,
        ) -> std::result::Result<HashMap<String, String>, StoreError> {
            self.record("hash_get_all", key);
            self.inner.hash_get_all(key)
        }

        fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.record("get", key);
            self.inner.get(key)
        }

        fn bit_count(&self, key: &str) -> std::result::Result<u64, StoreError> {
            self.record("bit_count", key);
            self.inner.bit_count(key)
        }
    }

    struct FailingStore;

    impl Store for FailingStore {
        fn set_members(&self, _: &str) -> std::result::Result<HashSet<String>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        fn hash_get_all(
            &self,
            _: &str,
        ) -> std::result::Result<HashMap<String, String>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        fn get(&self, _: &str) -> std::result::Result<Option<String>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        fn bit_count(&self, _: &str) -> std::result::Result<u64, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    fn reader(store: &RecordingStore) -> CounterReader<&RecordingStore> {
        CounterReader::new(store, 42).unwrap()
    }

    fn day(date: &str) -> CountFilter {
        CountFilter::new().with_date(date)
    }

    #[test]
    fn test_scalar_day_count() {
        let store = RecordingStore::default();
        store.inner.set("trk_42:signup:day:20240115:env:all:counts", "128");

        let value = reader(&store)
            .resolve_count("signup", Granularity::Day, &day("20240115"))
            .unwrap();

        assert_eq!(value, 128);
        assert_eq!(
            store.calls(),
            vec![("get", "trk_42:signup:day:20240115:env:all:counts".to_string())]
        );
    }

    #[test]
    fn test_unique_uses_bit_count() {
        let store = RecordingStore::default();
        let key = "trk_42:signup:day:20240115:user:unique:env:all:counts";
        for bit in [1, 4, 9, 33] {
            store.inner.set_bit(key, bit, true);
        }

        let value = reader(&store)
            .resolve_count("signup", Granularity::Day, &day("20240115").unique())
            .unwrap();

        assert_eq!(value, 4);
        assert_eq!(store.calls(), vec![("bit_count", key.to_string())]);
    }

    #[test]
    fn test_other_users_use_get() {
        let store = RecordingStore::default();
        let reader = reader(&store);

        for user in ["u-1", "Unique", "uniques", ""] {
            let filter = CountFilter::new().with_user(user);
            reader.event_total_counts("click", &filter).unwrap();
        }

        let calls = store.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|(op, _)| *op == "get"));
        assert_eq!(calls[0].1, "trk_42:click:total:user:u-1:env:all:counts");
        assert_eq!(calls[3].1, "trk_42:click:total:user::env:all:counts");
    }

    #[test]
    fn test_total_never_dated() {
        let store = RecordingStore::default();
        let reader = reader(&store);
        let filter = day("20240115").with_oid("99");

        let key = reader.count_key("signup", Granularity::Total, &filter);
        assert_eq!(key.key, "trk_42:signup:total:oid:99:env:all:counts");

        reader.event_total_counts("signup", &filter).unwrap();
        reader.app_total_counts(&filter).unwrap();
        assert!(store.calls().iter().all(|(_, key)| !key.contains("20240115")));
    }

    #[test]
    fn test_dated_without_date() {
        let store = RecordingStore::default();
        let key = reader(&store).count_key("signup", Granularity::Hour, &CountFilter::new());
        assert_eq!(key.key, "trk_42:signup:hour:env:all:counts");
    }

    #[test]
    fn test_segment_order() {
        let store = RecordingStore::default();
        let filter = CountFilter::new()
            .with_env("prod")
            .with_oid("sku-1")
            .with_user("u-7")
            .with_date("2024011509");

        let key = reader(&store).count_key("view", Granularity::Hour, &filter);
        assert_eq!(
            key.key,
            "trk_42:view:hour:2024011509:user:u-7:oid:sku-1:env:prod:counts"
        );
        assert_eq!(key.retrieval, Retrieval::Scalar);
    }

    #[test]
    fn test_env_default_and_verbatim() {
        let store = RecordingStore::default();
        let reader = reader(&store);

        let default = reader.count_key("e", Granularity::Year, &day("2024"));
        assert!(default.key.ends_with(":env:all:counts"));

        let custom = reader.count_key("e", Granularity::Year, &day("2024").with_env("Staging-EU"));
        assert!(custom.key.ends_with(":env:Staging-EU:counts"));
    }

    #[test]
    fn test_app_matches_event_all() {
        let store = RecordingStore::default();
        let reader = reader(&store);
        let filter = day("202401").with_user("u1").with_env("prod");

        reader.app_hour_counts(&filter).unwrap();
        reader.app_day_counts(&filter).unwrap();
        reader.app_week_counts(&filter).unwrap();
        reader.app_month_counts(&filter).unwrap();
        reader.app_year_counts(&filter).unwrap();
        reader.app_total_counts(&filter).unwrap();

        let expected: Vec<String> = Granularity::ALL
            .iter()
            .map(|g| reader.count_key("all", *g, &filter).key)
            .collect();
        let actual: Vec<String> = store.calls().into_iter().map(|(_, key)| key).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_event_facade_granularities() {
        let store = RecordingStore::default();
        let reader = reader(&store);
        let filter = day("X");

        reader.event_hour_counts("e", &filter).unwrap();
        reader.event_day_counts("e", &filter).unwrap();
        reader.event_week_counts("e", &filter).unwrap();
        reader.event_month_counts("e", &filter).unwrap();
        reader.event_year_counts("e", &filter).unwrap();
        reader.event_total_counts("e", &filter).unwrap();

        let keys: Vec<String> = store.calls().into_iter().map(|(_, key)| key).collect();
        assert_eq!(
            keys,
            vec![
                "trk_42:e:hour:X:env:all:counts",
                "trk_42:e:day:X:env:all:counts",
                "trk_42:e:week:X:env:all:counts",
                "trk_42:e:month:X:env:all:counts",
                "trk_42:e:year:X:env:all:counts",
                "trk_42:e:total:env:all:counts",
            ]
        );
    }

    #[test]
    fn test_absent_scalar_is_zero() {
        let store = RecordingStore::default();
        assert_eq!(reader(&store).app_day_counts(&day("20240101")).unwrap(), 0);
    }

    #[test]
    fn test_malformed_scalar_is_parse_error() {
        let store = RecordingStore::default();
        store.inner.set("trk_42:e:total:env:all:counts", "12abc");
        store.inner.set("trk_42:f:total:env:all:counts", "-3");
        store.inner.set("trk_42:g:total:env:all:counts", "");
        let reader = reader(&store);

        for event in ["e", "f", "g"] {
            let err = reader
                .event_total_counts(event, &CountFilter::new())
                .unwrap_err();
            assert!(matches!(err, Error::Parse { .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_store_error_propagates() {
        let reader = CounterReader::new(FailingStore, "app").unwrap();
        let filter = CountFilter::new();

        assert!(matches!(
            reader.event_total_counts("e", &filter),
            Err(Error::Store(StoreError::Backend(_)))
        ));
        assert!(matches!(
            reader.app_day_counts(&filter.clone().unique()),
            Err(Error::Store(_))
        ));
        assert!(matches!(reader.captured_events(), Err(Error::Store(_))));
        assert!(matches!(reader.event_envs("e"), Err(Error::Store(_))));
    }

    #[test]
    fn test_collections() {
        let store = RecordingStore::default();
        store.inner.add_member("trk_42:events", "signup");
        store.inner.add_member("trk_42:events", "login");
        store.inner.set_field("trk_42:signup:hashed:oid", "17", "plan-pro");
        store.inner.set_field("trk_42:signup:hashed:env", "prod", "prod");
        let reader = reader(&store);

        let events = reader.captured_events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.contains("signup"));

        let objects = reader.event_objects("signup").unwrap();
        assert_eq!(objects.get("17").map(String::as_str), Some("plan-pro"));

        let envs = reader.event_envs("signup").unwrap();
        assert_eq!(envs.len(), 1);

        assert!(reader.event_objects("login").unwrap().is_empty());

        assert_eq!(
            store.calls(),
            vec![
                ("set_members", "trk_42:events".to_string()),
                ("hash_get_all", "trk_42:signup:hashed:oid".to_string()),
                ("hash_get_all", "trk_42:signup:hashed:env".to_string()),
                ("hash_get_all", "trk_42:login:hashed:oid".to_string()),
            ]
        );
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            CounterReader::new(MemoryStore::new(), ""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            CounterReader::with_namespace(MemoryStore::new(), 1, ""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_custom_namespace_and_config() {
        let config = ReaderConfig::new("shop").with_namespace("stats");
        let reader = CounterReader::from_config(MemoryStore::new(), &config).unwrap();

        assert_eq!(reader.namespace(), "stats");
        assert_eq!(reader.app_id(), "shop");
        assert_eq!(reader.keys().events(), "stats_shop:events");

        let bad = ReaderConfig::new("");
        assert!(CounterReader::from_config(MemoryStore::new(), &bad).is_err());
    }

    #[test]
    fn test_snapshot() {
        let store = RecordingStore::default();
        store.inner.set("trk_42:signup:total:env:all:counts", "1000");
        let reader = reader(&store);

        let snapshot = reader
            .snapshot("signup", Granularity::Total, &day("20240115"))
            .unwrap();
        assert_eq!(snapshot.key, "trk_42:signup:total:env:all:counts");
        assert_eq!(snapshot.value, 1000);
        assert!(snapshot.date().is_none());
        assert!(!snapshot.unique);

        let unique = reader
            .snapshot("signup", Granularity::Day, &day("20240115").unique())
            .unwrap();
        assert!(unique.unique);
        assert_eq!(unique.date(), Some("20240115"));
        assert_eq!(unique.value, 0);
    }

    #[test]
    fn test_report_keeps_buckets_apart() {
        let store = RecordingStore::default();
        store.inner.set("trk_42:all:day:20240115:env:all:counts", "5");
        store.inner.set("trk_42:all:month:20240115:env:all:counts", "7");
        let reader = reader(&store);

        let report = reader
            .report(
                "all",
                &[Granularity::Day, Granularity::Month, Granularity::Total],
                &day("20240115"),
            )
            .unwrap();

        let values: Vec<u64> = report.counts.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![5, 7, 0]);
        assert!(report.timestamp_ms.is_none());
    }

    #[test]
    fn test_reader_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CounterReader<MemoryStore>>();
        assert_send_sync::<CounterReader<std::sync::Arc<MemoryStore>>>();
    }

    #[test]
    fn test_retrieval_display() {
        assert_eq!(Retrieval::Scalar.to_string(), "scalar");
        assert_eq!(Retrieval::BitCount.to_string(), "bitcount");
    }
}
