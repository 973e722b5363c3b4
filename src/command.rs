// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Line-oriented command layer over [`PathStore`].
//!
//! One command per line:
//!
//! ```text
//! help                    list commands
//! quit                    end the session
//! set <path> <value...>   value is the rest of the line, spaces included
//! print                   every "path value" pair, creation order
//! find <path>             value | "no data" | "not found"
//! list [path]             immediate children, one per line
//! search <value...>       first path holding the value | "not found"
//! delete [path]           delete subtree; bare keyword clears everything
//! ```
//!
//! Domain errors are printed as their sentinel text and the session
//! carries on. Unknown keywords are skipped.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::{CommandError, StoreError};
use crate::metrics;
use crate::path::Path;
use crate::store::PathStore;

const HELP: &[(&str, &str)] = &[
    ("help", "Prints the available commands."),
    ("quit", "Terminates the program."),
    ("set", "Adds or modifies the value to store."),
    ("print", "Prints all paths and values."),
    ("find", "Prints the stored value."),
    ("list", "Lists all immediate components of a sub-path."),
    ("search", "Searches for the path given a value."),
    ("delete", "Deletes a path and all its sub-paths."),
];

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Set { path: Path, value: String },
    Print,
    /// `None` when the argument names only the root, which holds nothing.
    Find(Option<Path>),
    /// `None` lists the top-level paths.
    List(Option<Path>),
    Search(String),
    /// `None` when the argument is blank or names only the root.
    Delete(Option<Path>),
    Clear,
}

/// Split at the first space or tab, consuming that one separator.
fn split_token(text: &str) -> (&str, Option<&str>) {
    match text.find([' ', '\t']) {
        Some(idx) => (&text[..idx], Some(&text[idx + 1..])),
        None => (text, None),
    }
}

/// First whitespace-delimited token of an argument string, if any.
fn path_token(rest: Option<&str>) -> Option<&str> {
    let (token, _) = split_token(rest?.trim_start());
    (!token.is_empty()).then_some(token)
}

impl Command {
    /// Parse one line (without its line terminator).
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (keyword, rest) = split_token(line);
        let command = match keyword {
            "help" => Self::Help,
            "quit" => Self::Quit,
            "print" => Self::Print,
            "set" => {
                let (raw_path, value) = split_token(rest.unwrap_or_default().trim_start());
                let path = Path::parse(raw_path).ok_or(CommandError::MissingArgument {
                    command: "set",
                    argument: "a path",
                })?;
                Self::Set {
                    path,
                    value: value.unwrap_or_default().to_string(),
                }
            }
            "find" => {
                let raw = path_token(rest).ok_or(CommandError::MissingArgument {
                    command: "find",
                    argument: "a path",
                })?;
                Self::Find(Path::parse(raw))
            }
            "list" => Self::List(path_token(rest).and_then(Path::parse)),
            "search" => Self::Search(
                rest.ok_or(CommandError::MissingArgument {
                    command: "search",
                    argument: "a value",
                })?
                .to_string(),
            ),
            // Only a bare keyword clears; anything after it names a path.
            "delete" => match rest {
                None => Self::Clear,
                Some(_) => Self::Delete(path_token(rest).and_then(Path::parse)),
            },
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Whether the session should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A store plus the sink its command output goes to.
pub struct Session<W: Write> {
    store: PathStore,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(store: PathStore, out: W) -> Self {
        Self { store, out }
    }

    pub fn store(&self) -> &PathStore {
        &self.store
    }

    pub fn into_parts(self) -> (PathStore, W) {
        (self.store, self.out)
    }

    fn print_error(&mut self, err: StoreError) -> Result<(), CommandError> {
        writeln!(self.out, "{}", err)?;
        Ok(())
    }

    /// Run one command, writing its output.
    pub fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        match command {
            Command::Help => {
                for (name, description) in HELP {
                    writeln!(self.out, "{}: {}", name, description)?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Set { path, value } => {
                if let Err(e) = self.store.set(&path, value) {
                    // Only an internal inconsistency gets here.
                    warn!(path = %path, error = %e, "Set failed");
                }
            }
            Command::Print => {
                for (path, value) in self.store.list_all() {
                    writeln!(self.out, "{} {}", path, value)?;
                }
            }
            Command::Find(path) => {
                let found = match &path {
                    Some(path) => self.store.find(path),
                    None => Err(StoreError::NotFound),
                };
                match found {
                    Ok(value) => writeln!(self.out, "{}", value)?,
                    Err(e) => self.print_error(e)?,
                }
            }
            Command::List(None) if self.store.is_empty() => {
                self.print_error(StoreError::NotFound)?;
            }
            Command::List(path) => match self.store.list_children(path.as_ref()) {
                Ok(names) => {
                    for name in names {
                        writeln!(self.out, "{}", name)?;
                    }
                }
                Err(e) => self.print_error(e)?,
            },
            Command::Search(value) => match self.store.search_by_value(&value) {
                Some(path) => writeln!(self.out, "{}", path)?,
                None => self.print_error(StoreError::NotFound)?,
            },
            Command::Delete(path) => {
                let deleted = match &path {
                    Some(path) => self.store.delete(path),
                    None => Err(StoreError::NotFound),
                };
                if let Err(e) = deleted {
                    self.print_error(e)?;
                }
            }
            Command::Clear => self.store.clear(),
        }
        Ok(Flow::Continue)
    }

    /// Read commands until `quit` or end of input.
    ///
    /// Malformed lines are logged and skipped; only I/O failures end the
    /// session early.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<(), CommandError> {
        let limit = self.store.config().max_line_bytes;

        for line in input.lines() {
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.trim().is_empty() {
                continue;
            }
            if line.len() > limit {
                let err = CommandError::LineTooLong {
                    len: line.len(),
                    limit,
                };
                warn!(error = %err, "Skipping command line");
                metrics::record_command_rejected("line_too_long");
                continue;
            }

            let command = match Command::parse(line) {
                Ok(command) => command,
                Err(e @ CommandError::UnknownCommand(_)) => {
                    debug!(error = %e, "Ignoring command");
                    metrics::record_command_rejected("unknown");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping command line");
                    metrics::record_command_rejected("malformed");
                    continue;
                }
            };

            if self.execute(command)? == Flow::Quit {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
