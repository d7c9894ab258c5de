//! Error type shared by the registry, the row store, the codec and the
//! command executor.
//!
//! Validation failures are always reported before any row is touched, so an
//! `Err` from a mutating call means the table is exactly as it was.

use std::fmt;
use std::path::PathBuf;

use snafu::prelude::*;

use crate::query::QueryErr;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which kind of name failed the identifier grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentKind {
    Database,
    Table,
    Column,
}

impl fmt::Display for IdentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentKind::Database => f.write_str("database"),
            IdentKind::Table => f.write_str("table"),
            IdentKind::Column => f.write_str("column"),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// A table or column name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[snafu(display("invalid {kind} name: {name:?}"))]
    InvalidIdentifier { kind: IdentKind, name: String },

    #[snafu(display("table {name} already exists"))]
    TableAlreadyExists { name: String },

    #[snafu(display("table {name} does not exist"))]
    TableNotFound { name: String },

    #[snafu(display("column {column} is declared twice in table {table}"))]
    DuplicateColumn { table: String, column: String },

    #[snafu(display("table {table} must declare at least one column"))]
    NoColumns { table: String },

    /// A row or assignment names a field the table does not declare.
    #[snafu(display("table {table} has no column named {column}"))]
    UnknownColumn { table: String, column: String },

    /// A positional payload does not line up with the declared columns.
    #[snafu(display("table {table} has {expected} columns, got {found} values"))]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// The text command did not match the grammar. `command` is the input
    /// as received (trimmed); `source` names the offending fragment.
    #[snafu(display("invalid command {command:?}: {source}"))]
    InvalidCommand { command: String, source: QueryErr },

    /// The table file is absent, or empty (no header record).
    #[snafu(display("no table data at {}", path.display()))]
    NotFound { path: PathBuf },

    #[snafu(display("failed to decode {}: {source}", path.display()))]
    Decode { path: PathBuf, source: csv::Error },

    #[snafu(display("malformed header in {}: {reason}", path.display()))]
    MalformedHeader { path: PathBuf, reason: String },

    #[snafu(display("failed to create directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("i/o error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    Write { path: PathBuf, source: csv::Error },

    /// Save kept going after a table failed; every failure is listed here.
    #[snafu(display("failed to save {} table(s): {}", failures.len(), describe(failures)))]
    PartialSave { failures: Vec<(String, Error)> },
}

fn describe(failures: &[(String, Error)]) -> String {
    failures
        .iter()
        .map(|(table, err)| format!("{table}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
