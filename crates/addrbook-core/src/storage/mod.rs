//! Storage layer
//!
//! Reading the book at startup and writing it back on save.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{parse_book, DataSource, Persistence, STDIO_ARG};
