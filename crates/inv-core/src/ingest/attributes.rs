//! Typed access to open-ended instance attributes.
//!
//! Provider attributes are an arbitrary JSON object. Each expected key is read
//! through an accessor that reports a type mismatch as a value instead of
//! coercing to a default.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// A key held a value of the wrong JSON type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Attribute '{key}' is {found}, expected {expected}")]
pub struct AttributeError {
    pub key: String,
    pub expected: &'static str,
    pub found: &'static str,
}

/// Instance attribute map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(Map<String, Value>);

impl AttributeMap {
    /// Wraps an existing JSON object.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a string attribute.
    ///
    /// `Ok(None)` when the key is absent or null, `Err` when it holds
    /// anything other than a string.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, AttributeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(AttributeError {
                key: key.to_string(),
                expected: "a string",
                found: json_type_name(other),
            }),
        }
    }

    /// Returns the string-valued entries of an object attribute.
    ///
    /// Entries with non-string values are dropped. A missing or non-object
    /// attribute yields an empty map.
    pub fn get_string_map(&self, key: &str) -> HashMap<String, String> {
        match self.0.get(key) {
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            _ => HashMap::new(),
        }
    }

    /// Returns a copy of the attributes as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for AttributeMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
