//! address-book core library
//!
//! This crate holds everything behind the `address-book` command: the entry
//! model, filters, the in-memory store, persistence and the interactive
//! command session.
//!
//! # Quick Start
//!
//! ```text
//! let persistence = Persistence::new(DataSource::File("book.json".into()));
//! let book = persistence.load(std::io::empty())?;
//!
//! let stdin = std::io::stdin();
//! let mut session = Session::new(
//!     EntryStore::new(book),
//!     persistence,
//!     stdin.lock(),
//!     std::io::stdout(),
//!     std::io::stderr(),
//! );
//! session.run()?;
//! ```
//!
//! # Modules
//!
//! - `models`: Entry and Book
//! - `filter`: pattern and field-map matching
//! - `store`: list/add/delete/count over a book
//! - `storage`: loading and saving books
//! - `session`: the line-oriented command loop
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod filter;
pub mod help;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{BookError, Result};
pub use filter::{Filter, MATCH_ALL};
pub use models::{Book, Entry};
pub use session::{Command, Session, SessionState, Verbosity};
pub use storage::{DataSource, Persistence, StorageError};
pub use store::{parse_entry, EntryStore};
