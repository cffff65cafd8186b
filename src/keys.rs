//! Storage key rendering.
//!
//! Every key read by this crate follows one naming convention:
//!
//! ```text
//! {namespace}_{appId}:[{eventId}:]{segment1}:{segment2}:...
//! ```
//!
//! The concrete layouts in use are:
//!
//! ```text
//! {ns}_{app}:{event}:{granularity}[:{date}][:user:{user}][:oid:{oid}]:env:{env|all}:counts
//! {ns}_{app}:events
//! {ns}_{app}:{event}:hashed:oid
//! {ns}_{app}:{event}:hashed:env
//! ```
//!
//! Segments are not validated. Callers must keep `:` out of event ids and
//! dimension values, otherwise keys of different shapes may collide.

/// Default namespace prefix for all keys.
pub const DEFAULT_NAMESPACE: &str = "trk";

/// Event id addressing the counters of the whole application.
pub const ALL_EVENTS: &str = "all";

/// Environment used when a query does not name one.
pub const ALL_ENVS: &str = "all";

/// Reserved user value selecting the unique-visitor bitmap.
pub const UNIQUE_USER: &str = "unique";

pub(crate) const SEPARATOR: char = ':';
pub(crate) const NAMESPACE_SEPARATOR: char = '_';

pub(crate) const EVENTS: &str = "events";
pub(crate) const HASHED: &str = "hashed";
pub(crate) const OID: &str = "oid";
pub(crate) const ENV: &str = "env";
pub(crate) const USER: &str = "user";
pub(crate) const COUNTS: &str = "counts";

/// Renders keys for one namespace and application.
///
/// # Examples
///
/// ```rust
/// use tracker_reader::keys::KeyBuilder;
///
/// let keys = KeyBuilder::new("trk", "42");
/// assert_eq!(keys.build(&["events"], None), "trk_42:events");
/// assert_eq!(keys.build(&["hashed", "oid"], Some("signup")), "trk_42:signup:hashed:oid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    namespace: String,
    app_id: String,
}

impl KeyBuilder {
    /// Creates a builder for the given namespace and application id.
    pub fn new(namespace: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            app_id: app_id.into(),
        }
    }

    /// Returns the namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the application id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Renders a key from ordered segments.
    ///
    /// The event id, when present, is placed before the segments, the app id
    /// before that, everything is joined with `:` and prefixed with
    /// `{namespace}_`.
    pub fn build(&self, segments: &[&str], event_id: Option<&str>) -> String {
        let capacity = self.namespace.len()
            + 1
            + self.app_id.len()
            + event_id.map_or(0, |e| e.len() + 1)
            + segments.iter().map(|s| s.len() + 1).sum::<usize>();

        let mut key = String::with_capacity(capacity);
        key.push_str(&self.namespace);
        key.push(NAMESPACE_SEPARATOR);
        key.push_str(&self.app_id);

        for segment in event_id.into_iter().chain(segments.iter().copied()) {
            key.push(SEPARATOR);
            key.push_str(segment);
        }

        key
    }

    /// Key of the set listing every captured event id.
    pub fn events(&self) -> String {
        self.build(&[EVENTS], None)
    }

    /// Key of the hash of object ids seen for an event.
    pub fn event_objects(&self, event_id: &str) -> String {
        self.build(&[HASHED, OID], Some(event_id))
    }

    /// Key of the hash of environments seen for an event.
    pub fn event_envs(&self, event_id: &str) -> String {
        self.build(&[HASHED, ENV], Some(event_id))
    }
}
