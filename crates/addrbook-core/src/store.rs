//! Entry store
//!
//! The `EntryStore` owns the book for the duration of a session and
//! implements the list/add/delete/count operations on top of [`Filter`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = EntryStore::new(book);
//!
//! store.add(Entry::new("Ann", "1 Main St"))?;
//! let listing = store.list(None);
//! let removed = store.delete(Some(&Filter::parse("Ann")?))?;
//! ```

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{BookError, Result};
use crate::filter::Filter;
use crate::models::{Book, Entry, ADDRESS_FIELD, NAME_FIELD};

/// Listing shown when a filter selects nothing
pub const NO_ENTRIES: &str = "(No entries found)";

/// In-memory address book with filtered operations
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    book: Book,
}

impl EntryStore {
    /// Wrap a loaded book
    pub fn new(book: Book) -> Self {
        Self { book }
    }

    /// The book in its current state
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Number of entries in the book
    pub fn len(&self) -> usize {
        self.book.entries.len()
    }

    /// Whether the book has no entries
    pub fn is_empty(&self) -> bool {
        self.book.entries.is_empty()
    }

    // ==================== Queries ====================

    /// All entries selected by the filter, in insertion order
    pub fn filtered(&self, filter: &Filter) -> Vec<&Entry> {
        self.book
            .entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .collect()
    }

    /// Format matching entries as `name: address` lines
    ///
    /// Without a filter every entry is listed.
    pub fn list(&self, filter: Option<&Filter>) -> String {
        let entries = self.filtered(filter.unwrap_or(&Filter::All));
        if entries.is_empty() {
            return NO_ENTRIES.to_string();
        }

        entries
            .iter()
            .map(|entry| entry.display_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Count matching entries
    pub fn count(&self, filter: Option<&Filter>) -> Result<String> {
        let filter = filter.ok_or(BookError::MissingFilter { command: "count" })?;
        Ok(format!("{} entries found", self.filtered(filter).len()))
    }

    // ==================== Mutations ====================

    /// Validate and append an entry
    ///
    /// Fails if `name` or `address` is missing, or if the name is taken.
    /// The book is left unchanged on failure.
    pub fn add(&mut self, entry: Entry) -> Result<String> {
        self.validate(&entry)?;

        info!(name = entry.name().unwrap_or_default(), "adding entry");
        self.book.entries.push(entry);
        Ok("Entry successfully added".to_string())
    }

    /// Remove every entry selected by the filter
    ///
    /// A filter is mandatory; pass `*` to empty the book.
    pub fn delete(&mut self, filter: Option<&Filter>) -> Result<String> {
        let filter = filter.ok_or(BookError::MissingFilter { command: "delete" })?;

        let before = self.len();
        self.book.entries.retain(|entry| !filter.matches(entry));
        let removed = before - self.len();

        debug!(%filter, removed, "deleted entries");
        if removed > 0 {
            Ok(format!("{} entries successfully deleted.", removed))
        } else {
            Ok("No entries matched; none deleted.".to_string())
        }
    }

    fn validate(&self, entry: &Entry) -> Result<()> {
        let name = required_text(entry, NAME_FIELD)?;
        required_text(entry, ADDRESS_FIELD)?;

        let same_name = Filter::field(NAME_FIELD, name);
        if !self.filtered(&same_name).is_empty() {
            return Err(BookError::DuplicateEntry(name.to_string()));
        }
        Ok(())
    }
}

/// Parse an `add` payload into an entry
///
/// The payload must be a JSON object; field validation happens in
/// [`EntryStore::add`].
pub fn parse_entry(data: &str) -> Result<Entry> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(fields)) => Ok(Entry::from_fields(fields)),
        Ok(other) => Err(BookError::MalformedInput(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(BookError::MalformedInput(e.to_string())),
    }
}

fn required_text<'a>(entry: &'a Entry, field: &'static str) -> Result<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or(BookError::Validation { field })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(entries: &[(&str, &str)]) -> EntryStore {
        let entries = entries
            .iter()
            .map(|(name, address)| Entry::new(*name, *address))
            .collect();
        EntryStore::new(Book::with_entries(entries))
    }

    fn all() -> Filter {
        Filter::All
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = store_with(&[("Cy", "3 Elm St"), ("Ann", "1 Main St"), ("Bo", "2 Oak St")]);
        assert_eq!(
            store.list(Some(&all())),
            "Cy: 3 Elm St\nAnn: 1 Main St\nBo: 2 Oak St"
        );
    }

    #[test]
    fn test_list_defaults_to_everything() {
        let store = store_with(&[("Ann", "1 Main St")]);
        assert_eq!(store.list(None), "Ann: 1 Main St");
    }

    #[test]
    fn test_list_empty() {
        let store = EntryStore::default();
        assert_eq!(store.list(None), NO_ENTRIES);

        let store = store_with(&[("Ann", "1 Main St")]);
        let filter = Filter::parse("Oak").unwrap();
        assert_eq!(store.list(Some(&filter)), NO_ENTRIES);
    }

    #[test]
    fn test_add_then_list() {
        let mut store = EntryStore::default();
        let msg = store.add(Entry::new("Ann", "1 Main St")).unwrap();
        assert_eq!(msg, "Entry successfully added");
        assert_eq!(store.list(None), "Ann: 1 Main St");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_keeps_extra_fields() {
        let mut store = EntryStore::default();
        let entry = parse_entry(r#"{"name":"Ann","address":"1 Main St","phone":"555-0100"}"#).unwrap();
        store.add(entry).unwrap();

        assert_eq!(store.book().entries[0].get("phone"), Some(&json!("555-0100")));
    }

    #[test]
    fn test_add_duplicate_name_rejected() {
        let mut store = store_with(&[("Ann", "1 Main St")]);
        let err = store.add(Entry::new("Ann", "2 Oak St")).unwrap_err();

        assert!(matches!(err, BookError::DuplicateEntry(ref name) if name == "Ann"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.list(None), "Ann: 1 Main St");
    }

    #[test]
    fn test_add_missing_fields_rejected() {
        let mut store = EntryStore::default();

        let no_address = parse_entry(r#"{"name":"Ann"}"#).unwrap();
        let err = store.add(no_address).unwrap_err();
        assert!(matches!(err, BookError::Validation { field: "address" }));

        let empty_name = Entry::new("", "1 Main St");
        let err = store.add(empty_name).unwrap_err();
        assert!(matches!(err, BookError::Validation { field: "name" }));

        let numeric_name = parse_entry(r#"{"name":5,"address":"1 Main St"}"#).unwrap();
        assert!(store.add(numeric_name).is_err());

        assert!(store.is_empty());
    }

    #[test]
    fn test_validation_runs_before_duplicate_check() {
        let mut store = store_with(&[("Ann", "1 Main St")]);
        let err = store.add(parse_entry(r#"{"name":"Ann"}"#).unwrap()).unwrap_err();
        assert!(matches!(err, BookError::Validation { .. }));
    }

    #[test]
    fn test_parse_entry_rejects_non_objects() {
        assert!(matches!(parse_entry("not json"), Err(BookError::MalformedInput(_))));
        assert!(matches!(parse_entry("[1, 2]"), Err(BookError::MalformedInput(_))));

        let err = parse_entry("42").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_delete_requires_filter() {
        let mut store = store_with(&[("Ann", "1 Main St")]);
        let err = store.delete(None).unwrap_err();

        assert!(matches!(err, BookError::MissingFilter { command: "delete" }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_all() {
        let mut store = store_with(&[("Ann", "1 Main St"), ("Bo", "2 Oak St")]);
        let msg = store.delete(Some(&all())).unwrap();

        assert_eq!(msg, "2 entries successfully deleted.");
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_by_pattern() {
        let mut store = store_with(&[("Ann", "1 Main St"), ("Bo", "2 Oak St"), ("Cy", "3 Main St")]);
        let msg = store.delete(Some(&Filter::parse("Main").unwrap())).unwrap();

        assert_eq!(msg, "2 entries successfully deleted.");
        assert_eq!(store.list(None), "Bo: 2 Oak St");
    }

    #[test]
    fn test_delete_nothing_matched() {
        let mut store = store_with(&[("Ann", "1 Main St")]);
        let msg = store.delete(Some(&Filter::parse("Zed").unwrap())).unwrap();

        assert_eq!(msg, "No entries matched; none deleted.");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_count_requires_filter() {
        let store = store_with(&[("Ann", "1 Main St")]);
        let err = store.count(None).unwrap_err();
        assert!(matches!(err, BookError::MissingFilter { command: "count" }));
    }

    #[test]
    fn test_count_agrees_with_filtered() {
        let store = store_with(&[("Ann", "1 Main St"), ("Bo", "2 Oak St"), ("Cy", "3 Main St")]);
        for arg in ["*", "Main", "Oak", "Zed", r#"{"name":"Bo"}"#, r#"{"city":"Oslo"}"#] {
            let filter = Filter::parse(arg).unwrap();
            let expected = format!("{} entries found", store.filtered(&filter).len());
            assert_eq!(store.count(Some(&filter)).unwrap(), expected, "filter {}", arg);
        }
    }
}
