//! In-memory result set implementing `RowFetch`.
//!
//! Behaves like a client library's binary-protocol fetch: each column is
//! copied into its bound buffer up to the buffer's capacity, the actual
//! length is always reported, and a truncated column can be fetched again
//! once its buffer has grown.

use bytes::Bytes;

use crate::bind::ColumnBinder;
use crate::error::{Error, Result};
use crate::fetch::{FetchStatus, RowFetch};

/// A fixed list of rows served through `RowFetch`.
#[derive(Debug, Clone, Default)]
pub struct MockResultSet {
    rows: Vec<Vec<Option<Bytes>>>,
    next_row: usize,
    current: Option<usize>,
    fetches: usize,
    refetches: usize,
}

impl MockResultSet {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; `None` is a NULL column.
    pub fn with_row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<Bytes>,
    {
        self.rows
            .push(values.into_iter().map(|v| v.map(Into::into)).collect());
        self
    }

    /// Number of rows in the result set.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of row fetch calls, including the one that reported no data.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Number of single-column re-fetch calls.
    pub fn refetch_count(&self) -> usize {
        self.refetches
    }

    fn store(column: &mut ColumnBinder<'_>, value: &Option<Bytes>) {
        match value {
            Some(data) => column.store(data),
            None => column.store_null(),
        }
    }
}

impl RowFetch for MockResultSet {
    fn fetch(&mut self, columns: &mut [ColumnBinder<'_>]) -> Result<FetchStatus> {
        self.fetches += 1;
        let Some(row) = self.rows.get(self.next_row) else {
            self.current = None;
            return Ok(FetchStatus::NoData);
        };
        if row.len() != columns.len() {
            return Err(Error::protocol(format!(
                "row {} has {} columns, statement binds {}",
                self.next_row,
                row.len(),
                columns.len()
            )));
        }

        for column in columns.iter_mut() {
            let value = row.get(column.index()).ok_or(Error::ColumnIndexOutOfBounds {
                index: column.index(),
                count: row.len(),
            })?;
            Self::store(column, value);
        }
        self.current = Some(self.next_row);
        self.next_row += 1;

        if columns.iter().any(|c| c.binding().is_truncated()) {
            Ok(FetchStatus::Truncated)
        } else {
            Ok(FetchStatus::Row)
        }
    }

    fn fetch_column(&mut self, column: &mut ColumnBinder<'_>) -> Result<()> {
        self.refetches += 1;
        let row = self
            .current
            .and_then(|i| self.rows.get(i))
            .ok_or_else(|| Error::protocol("no current row to fetch a column from"))?;
        let value = row
            .get(column.index())
            .ok_or(Error::ColumnIndexOutOfBounds {
                index: column.index(),
                count: row.len(),
            })?;
        Self::store(column, value);
        Ok(())
    }
}
