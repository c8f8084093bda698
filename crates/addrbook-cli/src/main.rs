//! address-book CLI
//!
//! Loads an address book from a JSON file or standard input and opens an
//! interactive command prompt on it.

use std::io;

use anyhow::{Context, Result};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing::debug;

use addrbook_core::help::{COMMAND_SUMMARY, FILTER_HELP};
use addrbook_core::{Config, DataSource, EntryStore, Persistence, Session, Verbosity};

mod logging;

/// Access an address book. You may add or delete entries, search for entries,
/// or get statistics about your address book.
#[derive(Parser, Debug)]
#[command(name = "address-book")]
#[command(version)]
struct Cli {
    /// Read from STDIN and write to STDOUT
    #[arg(value_name = "-", value_parser = ["-"], action = ArgAction::Append)]
    stdio: Vec<String>,

    /// Read from PATH and write to PATH ("-" for STDIN/STDOUT)
    #[arg(short = 'f', long = "datafile", value_name = "PATH", action = ArgAction::Append)]
    datafile: Vec<String>,

    /// Increase verbosity of output (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Silence all output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let matches = cli_command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let config = Config::load().context("Failed to load configuration")?;
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    logging::init(verbosity, config.log_level.as_deref());

    let source = resolve_source(&matches, &cli, &config);
    debug!(%source, verbosity = verbosity.level(), "starting");

    let persistence = Persistence::new(source).with_pretty(config.pretty);
    let stdin = io::stdin();
    let book = persistence
        .load(stdin.lock())
        .with_context(|| format!("Failed to load address book from {}", persistence.source()))?;

    let mut session = Session::new(
        EntryStore::new(book),
        persistence,
        stdin.lock(),
        io::stdout(),
        io::stderr(),
    )
    .with_verbosity(verbosity);

    session.run().context("Session aborted")?;
    Ok(())
}

/// Clap command with the interactive command summary appended to `--help`
fn cli_command() -> clap::Command {
    Cli::command().after_help(format!(
        "COMMANDS\n\nOnce the program has been initialized, you may use the following commands.\n\
         Note that for all [filter] parameters, asterisk (*) matches all.\n{}{}",
        COMMAND_SUMMARY, FILTER_HELP
    ))
}

/// Pick the data source; every `-` and `--datafile` replaces the previous one
fn resolve_source(matches: &ArgMatches, cli: &Cli, config: &Config) -> DataSource {
    let stdio = matches
        .indices_of("stdio")
        .into_iter()
        .flatten()
        .zip(&cli.stdio);
    let datafiles = matches
        .indices_of("datafile")
        .into_iter()
        .flatten()
        .zip(&cli.datafile);

    stdio
        .chain(datafiles)
        .max_by_key(|(index, _)| *index)
        .map(|(_, arg)| DataSource::from_arg(arg))
        .unwrap_or_else(|| config.default_source())
}
