// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the path store.
//!
//! Domain errors ([`StoreError`]) are returned as values and recovered
//! locally by the caller. Their `Display` output is the exact sentinel
//! text the command layer prints.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("no data")]
    NoData,
    /// Insert called on a path that is already indexed. Internal only:
    /// the store always checks existence before inserting.
    #[error("duplicate path '{0}'")]
    DuplicatePath(String),
}

impl StoreError {
    /// Metric/log label for this error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NoData => "no_data",
            Self::DuplicatePath(_) => "duplicate_path",
        }
    }
}

/// Structural corruption found by the invariant checkers.
///
/// Never produced by correct code; surfaced by
/// [`crate::PathStore::check_invariants`] for tests and debug builds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("index node '{path}' is unbalanced (left height {left}, right height {right})")]
    Unbalanced {
        path: String,
        left: usize,
        right: usize,
    },
    #[error("index node '{path}' stores height {stored}, actual {actual}")]
    HeightMismatch {
        path: String,
        stored: usize,
        actual: usize,
    },
    #[error("index keys out of order: '{before}' is not less than '{after}'")]
    OutOfOrder { before: String, after: String },
    #[error("registry entry '{path}' appears before its parent")]
    ParentMissing { path: String },
    #[error("descendants of '{path}' are not contiguous in the registry")]
    NotContiguous { path: String },
    #[error("index and registry disagree: {0}")]
    StructureMismatch(String),
}

/// Failures of the command layer.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command '{command}' requires {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("input line is {len} bytes, limit is {limit}")]
    LineTooLong { len: usize, limit: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid store config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_match_display() {
        assert_eq!(StoreError::NotFound.to_string(), "not found");
        assert_eq!(StoreError::NoData.to_string(), "no data");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(StoreError::NotFound.kind(), "not_found");
        assert_eq!(StoreError::DuplicatePath("/a".into()).kind(), "duplicate_path");
    }

    #[test]
    fn test_invariant_display() {
        let v = InvariantViolation::Unbalanced {
            path: "/a".into(),
            left: 3,
            right: 1,
        };
        assert_eq!(
            v.to_string(),
            "index node '/a' is unbalanced (left height 3, right height 1)"
        );
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::MissingArgument {
            command: "set",
            argument: "a path",
        };
        assert_eq!(err.to_string(), "command 'set' requires a path");
        assert_eq!(
            CommandError::UnknownCommand("frob".into()).to_string(),
            "unknown command 'frob'"
        );
    }

    #[test]
    fn test_command_error_from_io() {
        let err: CommandError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, CommandError::Io(_)));
    }
}
