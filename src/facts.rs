//! Host facts as seen by lookup plugins
//!
//! Facts are gathered elsewhere (the `setup` module of the engine, a fact
//! cache, a JSON dump on disk) and handed to lookups read-only.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Key under which `setup` output nests the gathered facts
pub const ANSIBLE_FACTS_KEY: &str = "ansible_facts";

/// Facts gathered from a host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts {
    data: IndexMap<String, Value>,
}

impl Facts {
    /// Create empty facts
    pub fn new() -> Self {
        Self::default()
    }

    /// Build facts from a JSON object.
    ///
    /// Accepts either a flat object of facts or the `{"ansible_facts": {...}}`
    /// envelope produced by the `setup` module.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(mut map) => {
                if map.len() == 1 && matches!(map.get(ANSIBLE_FACTS_KEY), Some(Value::Object(_))) {
                    if let Some(Value::Object(inner)) = map.remove(ANSIBLE_FACTS_KEY) {
                        return Ok(inner.into_iter().collect());
                    }
                }
                Ok(map.into_iter().collect())
            }
            other => Err(Error::FactsFormat(format!(
                "expected a mapping of facts, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Set a fact
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`Facts::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a fact
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a fact as a string, if it is one
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Merge another set of facts into this one; incoming values win
    pub fn merge(&mut self, other: Facts) {
        self.data.extend(other.data);
    }

    /// Get all facts
    pub fn all(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<IndexMap<String, Value>> for Facts {
    fn from(data: IndexMap<String, Value>) -> Self {
        Self { data }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Human-readable name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
