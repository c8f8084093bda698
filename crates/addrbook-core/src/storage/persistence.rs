//! Book persistence
//!
//! Loads the book once at startup and writes it back wholesale on `write` or
//! `quit`. The source is either a named JSON file or the standard streams.
//! File saves use atomic writes (write to temp file, then rename).

use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::{StorageError, StorageResult};
use crate::models::Book;

/// Command-line value selecting the standard streams
pub const STDIO_ARG: &str = "-";

/// Where the book is read from and written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Read stdin to the end at startup, write JSON to stdout on save
    Stdio,
    /// Read and overwrite a JSON file
    File(PathBuf),
}

impl DataSource {
    /// Interpret a command-line value, where `-` means the standard streams
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIO_ARG {
            DataSource::Stdio
        } else {
            DataSource::File(PathBuf::from(arg))
        }
    }

    /// Whether saves go to a named file
    pub fn is_file(&self) -> bool {
        matches!(self, DataSource::File(_))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Stdio => write!(f, "standard input"),
            DataSource::File(path) => write!(f, "'{}'", path.display()),
        }
    }
}

/// Persistence gateway for one data source
#[derive(Debug, Clone)]
pub struct Persistence {
    source: DataSource,
    pretty: bool,
}

impl Persistence {
    /// Create a gateway for the given source
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            pretty: false,
        }
    }

    /// Pretty-print JSON on save
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// The configured source
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Load the initial book
    ///
    /// A missing file yields an empty book. For [`DataSource::Stdio`] the
    /// given reader is consumed to the end before anything is parsed.
    pub fn load<R: Read>(&self, mut stdin: R) -> StorageResult<Book> {
        match &self.source {
            DataSource::File(path) => load_file(path),
            DataSource::Stdio => {
                let mut content = String::new();
                stdin
                    .read_to_string(&mut content)
                    .map_err(|source| StorageError::Stream {
                        stream: "standard input",
                        source,
                    })?;
                let book = parse_book(&content, &self.source.to_string())?;
                debug!(entries = book.entries.len(), "loaded book from standard input");
                Ok(book)
            }
        }
    }

    /// Serialize and store the whole book
    ///
    /// For [`DataSource::Stdio`] the JSON goes to the given writer without a
    /// trailing newline.
    pub fn save<W: Write>(&self, book: &Book, mut stdout: W) -> StorageResult<()> {
        let json = self.serialize(book)?;
        match &self.source {
            DataSource::File(path) => {
                atomic_write(path, json.as_bytes())?;
                info!(path = %path.display(), entries = book.entries.len(), "saved book");
                Ok(())
            }
            DataSource::Stdio => {
                let stream_err = |source| StorageError::Stream {
                    stream: "standard output",
                    source,
                };
                stdout.write_all(json.as_bytes()).map_err(stream_err)?;
                stdout.flush().map_err(stream_err)?;
                debug!(entries = book.entries.len(), "wrote book to standard output");
                Ok(())
            }
        }
    }

    fn serialize(&self, book: &Book) -> StorageResult<String> {
        let result = if self.pretty {
            serde_json::to_string_pretty(book)
        } else {
            serde_json::to_string(book)
        };
        result.map_err(StorageError::Serialize)
    }
}

/// Parse a book document
///
/// Blank input is an empty book. Anything else must be a JSON object; a
/// missing `entries` key becomes an empty list.
pub fn parse_book(content: &str, origin: &str) -> StorageResult<Book> {
    if content.trim().is_empty() {
        return Ok(Book::default());
    }

    let invalid = |details: String| StorageError::InvalidFormat {
        origin: origin.to_string(),
        details,
    };

    let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    if !value.is_object() {
        return Err(invalid("expected a JSON object at the top level".to_string()));
    }

    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

fn load_file(path: &Path) -> StorageResult<Book> {
    if !path.exists() {
        info!(path = %path.display(), "data file does not exist, starting with an empty book");
        return Ok(Book::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| StorageError::from_read(e, path.to_path_buf()))?;
    let book = parse_book(&content, &format!("'{}'", path.display()))?;

    debug!(path = %path.display(), entries = book.entries.len(), "loaded book");
    Ok(book)
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
            parent
        }
        None => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    let temp_path = temp.path().to_path_buf();

    temp.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    temp.persist(path)
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entry;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    fn sample_book() -> Book {
        let mut phone = Entry::new("Bo", "2 Oak St");
        phone.set("phone", "555-0100");
        Book::with_entries(vec![Entry::new("Ann", "1 Main St"), phone])
    }

    #[test]
    fn test_from_arg() {
        assert_eq!(DataSource::from_arg("-"), DataSource::Stdio);
        assert_eq!(
            DataSource::from_arg("book.json"),
            DataSource::File(PathBuf::from("book.json"))
        );
        assert!(DataSource::from_arg("book.json").is_file());
    }

    #[test]
    fn test_missing_file_is_empty_book() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = Persistence::new(DataSource::File(temp_dir.path().join("none.json")));

        let book = persistence.load(io::empty()).unwrap();
        assert!(book.entries.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.json");
        let persistence = Persistence::new(DataSource::File(path.clone()));

        let book = sample_book();
        persistence.save(&book, io::sink()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = persistence.load(io::empty()).unwrap();
        assert_eq!(loaded, book);
        assert_eq!(loaded.entries[1].get("phone"), book.entries[1].get("phone"));
    }

    #[test]
    fn test_save_leaves_sibling_files_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.json");
        let sibling = temp_dir.path().join("book.tmp");
        fs::write(&sibling, "user notes").unwrap();

        let persistence = Persistence::new(DataSource::File(path.clone()));
        persistence.save(&sample_book(), io::sink()).unwrap();
        persistence.save(&sample_book(), io::sink()).unwrap();

        assert_eq!(fs::read_to_string(&sibling).unwrap(), "user notes");
        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files left behind: {:?}", names);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("book.json");
        let persistence = Persistence::new(DataSource::File(path.clone()));

        persistence.save(&Book::default(), io::sink()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, r#"{"entries":[]}"#);
    }

    #[test]
    fn test_pretty_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.json");
        let persistence = Persistence::new(DataSource::File(path.clone())).with_pretty(true);

        persistence.save(&sample_book(), io::sink()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"entries\": ["));
        assert_eq!(persistence.load(io::empty()).unwrap(), sample_book());
    }

    #[test]
    fn test_file_without_entries_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.json");
        fs::write(&path, r#"{"owner":"me"}"#).unwrap();

        let persistence = Persistence::new(DataSource::File(path.clone()));
        let book = persistence.load(io::empty()).unwrap();
        assert!(book.entries.is_empty());

        persistence.save(&book, io::sink()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, r#"{"entries":[],"owner":"me"}"#);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.json");
        fs::write(&path, "{not json").unwrap();

        let err = Persistence::new(DataSource::File(path))
            .load(io::empty())
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
    }

    #[test]
    fn test_non_object_document_is_an_error() {
        let err = parse_book("[1, 2, 3]", "test").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_load_from_stdin() {
        let persistence = Persistence::new(DataSource::Stdio);
        let input = Cursor::new(r#"{"entries":[{"name":"Ann","address":"1 Main St"}]}"#);

        let book = persistence.load(input).unwrap();
        assert_eq!(book.entries, vec![Entry::new("Ann", "1 Main St")]);
    }

    #[test]
    fn test_load_from_empty_stdin() {
        let persistence = Persistence::new(DataSource::Stdio);
        let book = persistence.load(Cursor::new("")).unwrap();
        assert!(book.entries.is_empty());
    }

    #[test]
    fn test_save_to_stdout() {
        let persistence = Persistence::new(DataSource::Stdio);
        let mut out = Vec::new();

        persistence.save(&sample_book(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!text.ends_with('\n'));
        assert_eq!(parse_book(&text, "stdout").unwrap(), sample_book());
    }
}
