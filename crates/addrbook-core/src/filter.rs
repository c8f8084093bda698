//! Entry matching
//!
//! A filter is either a pattern searched for in an entry's `name` and
//! `address`, or a map of field values the entry must agree with.

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{BookError, Result};
use crate::models::{Entry, ADDRESS_FIELD, NAME_FIELD};

/// Pattern that matches every entry
pub const MATCH_ALL: &str = "*";

/// Selects a subset of the book's entries
#[derive(Debug, Clone)]
pub enum Filter {
    /// The `*` wildcard
    All,
    /// Regular expression searched for in `name` and `address`
    Pattern(Regex),
    /// Field-equality map
    Fields(Map<String, Value>),
}

impl Filter {
    /// Build a filter from a command argument
    ///
    /// `*` selects everything, a JSON object becomes a field map, and any
    /// other text is compiled as a regular expression, surrounding spaces
    /// included.
    pub fn parse(arg: &str) -> Result<Self> {
        if arg == MATCH_ALL {
            return Ok(Filter::All);
        }

        if arg.trim_start().starts_with('{') {
            if let Ok(fields) = serde_json::from_str::<Map<String, Value>>(arg) {
                return Ok(Filter::Fields(fields));
            }
        }

        Self::pattern(arg)
    }

    /// Build a pattern filter, treating `*` as the wildcard
    pub fn pattern(pattern: &str) -> Result<Self> {
        if pattern == MATCH_ALL {
            return Ok(Filter::All);
        }
        Regex::new(pattern)
            .map(Filter::Pattern)
            .map_err(|source| BookError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Build a single-field equality filter
    pub fn field(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(key.into(), value.into());
        Filter::Fields(fields)
    }

    /// Check whether an entry is selected by this filter
    ///
    /// For field maps, keys the entry does not have are skipped, so an entry
    /// lacking every filtered key matches.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::All => true,
            Filter::Pattern(re) => [NAME_FIELD, ADDRESS_FIELD]
                .iter()
                .filter_map(|key| entry.get(key).and_then(Value::as_str))
                .any(|text| re.is_match(text)),
            Filter::Fields(fields) => fields
                .iter()
                .all(|(key, expected)| entry.get(key).map_or(true, |actual| actual == expected)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "{}", MATCH_ALL),
            Filter::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Filter::Fields(fields) => write!(f, "{}", Value::Object(fields.clone())),
        }
    }
}
