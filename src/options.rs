//! Fetch configuration.

use std::env;

use crate::error::{Error, Result};

/// Default upper bound for a single column value (1 GiB, the largest packet
/// a MySQL server will send).
pub const DEFAULT_MAX_COLUMN_LENGTH: usize = 1 << 30;

/// Environment variable overriding `max_column_length`.
pub const ENV_MAX_COLUMN_LENGTH: &str = "ROWBIND_MAX_COLUMN_LENGTH";

/// Environment variable overriding `initial_capacity`.
pub const ENV_INITIAL_CAPACITY: &str = "ROWBIND_INITIAL_CAPACITY";

/// Options for a row fetch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Largest reported column length a growable column may be resized to.
    pub max_column_length: usize,
    /// Capacity reserved for growable columns at bind time (0 keeps the
    /// container's own capacity).
    pub initial_capacity: usize,
}

impl FetchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self {
            max_column_length: DEFAULT_MAX_COLUMN_LENGTH,
            initial_capacity: 0,
        }
    }

    /// Set the maximum column length.
    ///
    /// # Example
    ///
    /// ```
    /// use mysql_rowbind::FetchOptions;
    ///
    /// let options = FetchOptions::new().with_max_column_length(64 * 1024);
    /// assert_eq!(options.max_column_length, 65536);
    /// ```
    pub fn with_max_column_length(mut self, limit: usize) -> Self {
        self.max_column_length = limit;
        self
    }

    /// Set the capacity reserved for growable columns when they are bound.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Load options from the environment, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::new();
        if let Some(limit) = read_env(ENV_MAX_COLUMN_LENGTH)? {
            options.max_column_length = limit;
        }
        if let Some(capacity) = read_env(ENV_INITIAL_CAPACITY)? {
            options.initial_capacity = capacity;
        }
        Ok(options)
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env(key: &str) -> Result<Option<usize>> {
    match env::var(key) {
        Ok(value) => parse_size(key, &value).map(Some),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(Error::InvalidConfig {
            message: format!("{key} is not valid unicode"),
        }),
    }
}

fn parse_size(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidConfig {
            message: format!("Invalid {key}: {value}"),
        })
}
