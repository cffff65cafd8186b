//! Reader configuration.
//!
//! A [`ReaderConfig`] names the namespace and application whose counters a
//! [`CounterReader`](crate::CounterReader) reads, and optionally where the
//! store lives. With the `toml` feature it can be loaded from a file:
//!
//! ```toml
//! app_id = "42"
//! namespace = "trk"              # optional, defaults to "trk"
//! redis_url = "redis://127.0.0.1/"  # optional
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::DEFAULT_NAMESPACE;

/// Configuration for a [`CounterReader`](crate::CounterReader).
///
/// # Examples
///
/// ```rust
/// use tracker_reader::config::ReaderConfig;
///
/// let config = ReaderConfig::new(42).with_namespace("stats");
/// assert_eq!(config.app_id, "42");
/// assert!(config.validate().is_ok());
///
/// assert!(ReaderConfig::new("").validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReaderConfig {
    /// Key prefix scoping this system within a shared store.
    #[cfg_attr(feature = "serde", serde(default = "default_namespace"))]
    pub namespace: String,
    /// Application whose counters are read.
    pub app_id: String,
    /// Connection URL of the store, if the caller wants the config to carry it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub redis_url: Option<String>,
}

#[cfg(feature = "serde")]
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl ReaderConfig {
    /// Creates a configuration for `app_id` in the default namespace.
    pub fn new(app_id: impl ToString) -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            app_id: app_id.to_string(),
            redis_url: None,
        }
    }

    /// Sets the namespace prefix.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the store URL.
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Checks that the configuration can address keys.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(Error::Config("app id must not be empty".to_string()));
        }
        if self.namespace.is_empty() {
            return Err(Error::Config("namespace must not be empty".to_string()));
        }
        if matches!(self.redis_url.as_deref(), Some("")) {
            return Err(Error::Config("redis url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parses and validates a TOML configuration.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    #[cfg(feature = "toml")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading reader config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
