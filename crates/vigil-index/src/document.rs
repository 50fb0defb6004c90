//! Documents: typed field values keyed by field name.
//!
//! A [`Document`] is what callers hand to the writer and what search hands
//! back (restricted to stored fields). Values are deliberately a small closed
//! set mirroring the field kinds in [`crate::Schema`].

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};

/// A single typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text, identifier, or keyword content.
    Str(String),
    /// A boolean flag.
    Bool(bool),
    /// An absolute timestamp (UTC, second precision once indexed).
    Date(DateTime<Utc>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339()),
        }
    }
}

/// A mapping from field names to typed values.
///
/// Documents are plain values; validation against a schema happens when they
/// reach a writer session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Field values, ordered by field name.
    values: BTreeMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a string field value.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns a boolean field value.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns a timestamp field value.
    pub fn get_date(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// Iterates over `(name, value)` pairs in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of set fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
