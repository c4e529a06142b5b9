//! Ambient settings handed to metastore connectors.
//!
//! Unless a cache is given fixed settings, connectors receive a fresh
//! snapshot on every handshake, built from the process environment.
//! Variables under the prefix are stripped of it, lowercased, and `__`
//! becomes `.`, so `METAPORT_CONF_SASL__QOP=auth-conf` turns into
//! `sasl.qop = auth-conf`.

use std::collections::BTreeMap;
use tracing::debug;

/// Default prefix for ambient connector settings
pub const DEFAULT_ENV_PREFIX: &str = "METAPORT_CONF";

/// Snapshot of key/value settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    values: BTreeMap<String, String>,
}

impl EnvConfig {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the process environment using [`DEFAULT_ENV_PREFIX`]
    pub fn from_env() -> Self {
        Self::from_vars(DEFAULT_ENV_PREFIX, std::env::vars())
    }

    /// Load settings from arbitrary `(name, value)` pairs
    pub fn from_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values = BTreeMap::new();

        for (key, value) in vars {
            let Some(rest) = key.strip_prefix(prefix).and_then(|r| r.strip_prefix('_')) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let name = rest.split("__").map(|s| s.to_lowercase()).collect::<Vec<_>>().join(".");
            values.insert(name, value);
        }

        debug!("Loaded {} connector settings with prefix '{}'", values.len(), prefix);
        Self { values }
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
