//! Error types for row binding and fetching.

use std::collections::TryReserveError;
use std::panic::Location;
use std::str::Utf8Error;
use thiserror::Error;

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for column binding and row fetch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// `resize` was called when it cannot apply: the column is not
    /// dynamic, or the reported length does not exceed the bound capacity.
    #[error("Unexpected resize of column {column}: {message} (called at {location})")]
    UnexpectedResize {
        column: usize,
        message: String,
        location: &'static Location<'static>,
    },

    /// Growing the backing container failed.
    #[error("Failed to allocate {requested} bytes for column {column}")]
    AllocationFailed {
        column: usize,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// A fixed-size column received more data than it can hold.
    #[error("Column {column} truncated: need {needed} bytes, fixed buffer has {available}")]
    Truncated {
        column: usize,
        needed: usize,
        available: usize,
    },

    /// Reported column length is above the configured limit.
    #[error("Column {column} length {length} exceeds limit of {limit} bytes")]
    ColumnTooLarge {
        column: usize,
        length: usize,
        limit: usize,
    },

    /// Text column data is not valid UTF-8.
    #[error("Column {column} contains invalid UTF-8")]
    InvalidText {
        column: usize,
        #[source]
        source: Utf8Error,
    },

    /// The binding is already attached to another binder.
    #[error("Column {column} is already bound")]
    AlreadyBound { column: usize },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// Not every column of the statement has a binder.
    #[error("Bound {bound} of {expected} columns")]
    ColumnCountMismatch { expected: usize, bound: usize },

    /// Invalid fetch configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The fetch collaborator reported something inconsistent.
    #[error("Protocol error: {message}")]
    Protocol { message: String },
}

impl Error {
    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create an unexpected-resize error located at the caller.
    #[track_caller]
    pub(crate) fn unexpected_resize(column: usize, message: impl Into<String>) -> Self {
        Self::UnexpectedResize {
            column,
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Whether this error is a violation of the binding contract by the
    /// caller, rather than a runtime condition.
    pub fn is_logic_error(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedResize { .. }
                | Error::AlreadyBound { .. }
                | Error::ColumnIndexOutOfBounds { .. }
                | Error::ColumnCountMismatch { .. }
        )
    }
}
