use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Arguments handed to [`Driver::connect`](crate::traits::Driver::connect).
///
/// `target` identifies the database system instance (a path, URL or DSN);
/// `options` carries driver-specific arguments the contract does not interpret.
///
/// Can be loaded from TOML:
/// ```toml
/// target = "postgres://localhost/app"
///
/// [options]
/// sslmode = "disable"
/// port = 5432
/// keepalive = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub target: String,
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

impl ConnectOptions {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            options: BTreeMap::new(),
        }
    }

    /// Set a driver-specific option, replacing any previous value.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.options.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(toml::Value::as_integer)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(toml::Value::as_bool)
    }

    /// Parse options from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}
