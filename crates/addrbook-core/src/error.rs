//! Error types for address book operations
//!
//! Every variant except the storage and I/O wrappers is a user mistake the
//! session loop reports before prompting again.

use std::io;

use thiserror::Error;

use crate::help::COMMAND_SUMMARY;
use crate::storage::StorageError;

/// Result type alias for address book operations
pub type Result<T> = std::result::Result<T, BookError>;

/// Core error type for address book operations
#[derive(Debug, Error)]
pub enum BookError {
    /// `add` payload that is not a JSON object
    #[error("If you pass data to the add command, it must be a valid JSON object ({0})")]
    MalformedInput(String),

    /// Entry without a usable `name` or `address`
    #[error("You must provide at least name and address fields for your entry ('{field}' is missing or empty)")]
    Validation { field: &'static str },

    /// An entry with the same name is already in the book
    #[error("Looks like you've already got an entry named '{0}'.")]
    DuplicateEntry(String),

    /// `delete` or `count` called without a filter
    #[error("You must pass a filter to the {command} command. You may pass asterisk (*) to {command} all entries.")]
    MissingFilter { command: &'static str },

    /// Filter text that is not a valid regular expression
    #[error("Invalid filter '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Keyword that matches no known command
    #[error("Command '{0}' not recognized. Recognized commands are:\n{}", COMMAND_SUMMARY)]
    UnrecognizedCommand(String),

    /// Input ended while a prompt was waiting for an answer
    #[error("Input closed while waiting for {0}")]
    InputClosed(&'static str),

    /// Loading or saving the book failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Prompt or result could not be written
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BookError {
    /// Whether the error leaves the book untouched and the session usable
    pub fn is_user_error(&self) -> bool {
        !matches!(self, BookError::Storage(_) | BookError::Io(_))
    }
}
