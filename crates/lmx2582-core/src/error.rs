//! Error types for register loading and table parsing

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a register load
///
/// Every variant is terminal for the run. There is no retry and no resume
/// from the failing offset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Register table has the wrong total size
    #[error("Bad data: register table is {actual} bytes, expected {expected}")]
    DataIntegrity { expected: usize, actual: usize },

    /// Device could not be opened
    #[error("Can't open spi device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Driver reported an error for a register write
    #[error("Write error at byte {offset}: {source}")]
    Write {
        offset: usize,
        #[source]
        source: io::Error,
    },

    /// Driver accepted fewer bytes than requested (strict policy only)
    #[error("Short write at byte {offset}: {written} of {requested} bytes accepted")]
    ShortWrite {
        offset: usize,
        written: usize,
        requested: usize,
    },
}

impl LoadError {
    /// Byte offset of the failing write, if the error came from the write loop
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Write { offset, .. } | Self::ShortWrite { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Errors from reading or parsing a register table file
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read the file
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File has no content
    #[error("Register file is empty")]
    Empty,

    /// Wrong number of lines
    #[error("Bad data: expected {expected} register lines, found {found}")]
    LineCount { expected: usize, found: usize },

    /// Line is not `<name>\t<value>`
    #[error("Bad data in line {line}: expected register name and value separated by a tab")]
    Malformed { line: usize },

    /// Register name is not `R<n>`
    #[error("Register name in line {line} appears to be bad: {name:?}")]
    BadName { line: usize, name: String },

    /// Register appears out of programming order
    #[error("Expected register number {expected} in line {line}, but there was {found}")]
    UnexpectedRegister {
        line: usize,
        expected: u8,
        found: u8,
    },

    /// Value is not `0x` followed by six hex digits
    #[error("Bad register data for {name} (line {line}): {reason}")]
    BadValue {
        line: usize,
        name: String,
        reason: &'static str,
    },
}

/// Result type for register loading
pub type Result<T> = std::result::Result<T, LoadError>;
