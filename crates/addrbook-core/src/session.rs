//! Interactive command session
//!
//! A [`Session`] reads one command per line from its input, runs it against
//! the [`EntryStore`] and writes the result to its output. Errors go to the
//! error stream and never end the session; only `quit` (or the end of input)
//! does.
//!
//! The three streams are injected so the loop can run against in-memory
//! buffers as well as the real terminal.

use std::io::{BufRead, Write};

use tracing::{debug, error, info, warn};

use crate::error::{BookError, Result};
use crate::filter::Filter;
use crate::help::COMMAND_SUMMARY;
use crate::models::Entry;
use crate::storage::Persistence;
use crate::store::{parse_entry, EntryStore};

/// Prompt shown before every command
pub const PROMPT: &str = "Command: ";

/// How chatty the session is
///
/// 0 is quiet, 1 is the default, every extra `-v` adds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const QUIET: Verbosity = Verbosity(0);
    pub const NORMAL: Verbosity = Verbosity(1);

    /// Create from CLI flags; quiet wins over any number of `-v`
    pub fn from_flags(quiet: bool, extra: u8) -> Self {
        if quiet {
            Self::QUIET
        } else {
            Verbosity(Self::NORMAL.0.saturating_add(extra))
        }
    }

    /// Numeric level
    pub fn level(self) -> u8 {
        self.0
    }

    /// Check if prompts and banners are suppressed
    pub fn is_quiet(self) -> bool {
        self.0 == 0
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    Terminated,
}

/// One parsed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    List(Option<&'a str>),
    Add(Option<&'a str>),
    Delete(Option<&'a str>),
    Count(Option<&'a str>),
    Write,
    Quit,
}

impl<'a> Command<'a> {
    /// Parse a line into a command
    ///
    /// The line is split at the first whitespace. Keywords match by prefix, so
    /// `listing *` runs `list *`.
    pub fn parse(line: &'a str) -> Result<Self> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then_some(rest);

        let command = if keyword.starts_with("help") {
            Command::Help
        } else if keyword.starts_with("list") {
            Command::List(arg)
        } else if keyword.starts_with("add") {
            Command::Add(arg)
        } else if keyword.starts_with("delete") {
            Command::Delete(arg)
        } else if keyword.starts_with("count") {
            Command::Count(arg)
        } else if keyword.starts_with("write") {
            Command::Write
        } else if keyword.starts_with("quit") {
            Command::Quit
        } else {
            return Err(BookError::UnrecognizedCommand(line.to_string()));
        };
        Ok(command)
    }
}

/// An interactive address book session
pub struct Session<R, W, E> {
    store: EntryStore,
    persistence: Persistence,
    input: R,
    output: W,
    errors: E,
    verbosity: Verbosity,
    state: SessionState,
}

impl<R: BufRead, W: Write, E: Write> Session<R, W, E> {
    /// Create a session over a loaded store
    pub fn new(store: EntryStore, persistence: Persistence, input: R, output: W, errors: E) -> Self {
        Self {
            store,
            persistence,
            input,
            output,
            errors,
            verbosity: Verbosity::default(),
            state: SessionState::AwaitingCommand,
        }
    }

    /// Set the verbosity
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn errors(&self) -> &E {
        &self.errors
    }

    /// Run until `quit` or end of input
    ///
    /// Command errors are reported and the loop goes on. Only failures of the
    /// streams themselves are returned.
    pub fn run(&mut self) -> Result<()> {
        info!(
            source = %self.persistence.source(),
            entries = self.store.len(),
            "session started"
        );
        while self.step()? == SessionState::AwaitingCommand {}
        info!(entries = self.store.len(), "session ended");
        Ok(())
    }

    /// Prompt for, read and execute a single command
    pub fn step(&mut self) -> Result<SessionState> {
        if self.state == SessionState::Terminated {
            return Ok(self.state);
        }

        let line = match self.prompt(PROMPT)? {
            Some(line) => line,
            None => {
                debug!("input closed, saving and quitting");
                let outcome = self.quit();
                self.state = SessionState::Terminated;
                self.report(outcome)?;
                return Ok(self.state);
            }
        };

        let outcome = Command::parse(&line).and_then(|command| self.dispatch(command));
        self.report(outcome)?;
        Ok(self.state)
    }

    fn dispatch(&mut self, command: Command<'_>) -> Result<Option<String>> {
        debug!(?command, "dispatching command");
        match command {
            Command::Help => {
                write!(self.output, "\nAvailable commands:\n{}\n", COMMAND_SUMMARY)?;
                Ok(None)
            }
            Command::List(arg) => {
                let filter = parse_filter(arg)?;
                Ok(Some(self.store.list(filter.as_ref())))
            }
            Command::Add(data) => {
                let entry = match data {
                    Some(data) => parse_entry(data)?,
                    None => self.ask_entry()?,
                };
                self.store.add(entry).map(Some)
            }
            Command::Delete(arg) => {
                let filter = parse_filter(arg)?;
                self.store.delete(filter.as_ref()).map(Some)
            }
            Command::Count(arg) => {
                let filter = parse_filter(arg)?;
                self.store.count(filter.as_ref()).map(Some)
            }
            Command::Write => self.write(),
            Command::Quit => self.quit(),
        }
    }

    /// Save the book; file saves report success, stdout saves print the JSON
    fn write(&mut self) -> Result<Option<String>> {
        self.persistence.save(self.store.book(), &mut self.output)?;
        Ok(self
            .persistence
            .source()
            .is_file()
            .then(|| "Save successful".to_string()))
    }

    /// Save and stop; a failed save leaves the session running
    fn quit(&mut self) -> Result<Option<String>> {
        self.say("\nSaving and quitting.\n")?;
        self.write()?;
        self.state = SessionState::Terminated;
        Ok(None)
    }

    /// Interactive fallback for `add` without data
    fn ask_entry(&mut self) -> Result<Entry> {
        let name = self
            .prompt("Name: ")?
            .ok_or(BookError::InputClosed("a name"))?;
        let address = self
            .prompt("Address: ")?
            .ok_or(BookError::InputClosed("an address"))?;
        Ok(Entry::new(name, address))
    }

    /// Show a prompt and read one trimmed line, `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        self.say(label)?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Write text that quiet mode suppresses
    fn say(&mut self, text: &str) -> Result<()> {
        if !self.verbosity.is_quiet() {
            self.output.write_all(text.as_bytes())?;
            self.output.flush()?;
        }
        Ok(())
    }

    fn report(&mut self, outcome: Result<Option<String>>) -> Result<()> {
        match outcome {
            Ok(Some(message)) => {
                write!(self.output, "\n{}\n", message)?;
                self.output.flush()?;
            }
            Ok(None) => {}
            Err(e) => {
                match &e {
                    BookError::Storage(storage) if storage.is_recoverable() => {
                        warn!(error = %e, "save failed, retry with write once fixed");
                    }
                    e if e.is_user_error() => debug!(error = %e, "command rejected"),
                    _ => error!(error = %e, "command failed"),
                }
                write!(self.errors, "\nERROR: {}\n", e)?;
                if let BookError::Storage(storage) = &e {
                    if let Some(hint) = storage.recovery_suggestion() {
                        writeln!(self.errors, "{}", hint)?;
                    }
                }
                self.errors.flush()?;
            }
        }
        Ok(())
    }
}

fn parse_filter(arg: Option<&str>) -> Result<Option<Filter>> {
    arg.map(Filter::parse).transpose()
}
