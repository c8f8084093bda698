//! Data models for the address book
//!
//! An [`Entry`] is a free-form JSON object that must carry at least a `name`
//! and an `address`. A [`Book`] is the ordered list of entries plus whatever
//! other top-level keys the data file happened to contain.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the entry's unique name
pub const NAME_FIELD: &str = "name";

/// Field holding the entry's address
pub const ADDRESS_FIELD: &str = "address";

/// A single address book record
///
/// Fields other than `name` and `address` are kept verbatim and in the order
/// they were written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Entry(Map<String, Value>);

impl Entry {
    /// Create an entry with just a name and an address
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(NAME_FIELD.to_string(), Value::String(name.into()));
        fields.insert(ADDRESS_FIELD.to_string(), Value::String(address.into()));
        Self(fields)
    }

    /// Wrap an already-parsed JSON object
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// All fields of the entry
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// The `name` field, if it is a string
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD).and_then(Value::as_str)
    }

    /// The `address` field, if it is a string
    pub fn address(&self) -> Option<&str> {
        self.get(ADDRESS_FIELD).and_then(Value::as_str)
    }

    /// Render the entry as a `name: address` listing line
    pub fn display_line(&self) -> String {
        format!(
            "{}: {}",
            field_text(self.get(NAME_FIELD)),
            field_text(self.get(ADDRESS_FIELD))
        )
    }
}

/// Text shown for a field in listings
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// The whole address book document
///
/// Serialized as `{"entries": [...]}`. Unknown top-level keys survive a
/// load/save cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Entries in insertion order
    #[serde(default)]
    pub entries: Vec<Entry>,

    /// Any other top-level keys found in the source document
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    /// Create a book from a list of entries
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            extra: Map::new(),
        }
    }
}
