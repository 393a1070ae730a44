//! Localization document model.

use serde::Serialize;
use serde_json::{Map, Value};

/// One localization file: an ordered `key → value` mapping.
///
/// Insertion order follows the source file so that write-back can reproduce
/// line order. String values are translation units; other JSON scalars are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizationDocument {
    entries: Map<String, Value>,
}

impl LocalizationDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The value for `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Set a string value, keeping the key's position if it already exists.
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Value::String(value.into()));
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Only the entries whose value is a string, in document order.
    pub fn string_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// Plain serialization with four-space indentation.
    pub fn to_pretty_json(&self) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        match self.entries.serialize(&mut ser) {
            Ok(()) => String::from_utf8(buf).unwrap_or_default(),
            Err(_) => String::from("{}"),
        }
    }
}

impl FromIterator<(String, String)> for LocalizationDocument {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Self { entries }
    }
}
