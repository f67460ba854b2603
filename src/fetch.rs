//! Row fetch loop with resize-and-refetch for truncated columns.
//!
//! The `RowFetch` trait is the contract with the client library that fills
//! the bindings. `RowFetcher` drives it one row at a time: after each fetch
//! it checks every binding for truncation, grows dynamic columns to the
//! reported length and re-fetches them, and fails the row when a fixed-size
//! column is too small.

use std::sync::Arc;

use crate::bind::{BindTarget, BindingTable, ColumnBinder, ColumnBinding};
use crate::error::{Error, Result};
use crate::options::FetchOptions;
use crate::types::{ColumnValue, Row};

/// Outcome of a row fetch, as reported by the client library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// A row was fetched and every column fit its buffer.
    Row,
    /// A row was fetched but at least one column was truncated.
    Truncated,
    /// No more rows.
    NoData,
}

/// Fetch side of a prepared statement.
///
/// Implementations hand each column value to its binder with
/// `ColumnBinder::store` or `ColumnBinder::store_null`, which copy at most
/// the bound capacity, record the actual length and set the truncation
/// indicator.
pub trait RowFetch {
    /// Fetch the next row into `columns`.
    fn fetch(&mut self, columns: &mut [ColumnBinder<'_>]) -> Result<FetchStatus>;

    /// Fetch one column of the current row again, from offset 0, into the
    /// (possibly grown) storage of `column`.
    fn fetch_column(&mut self, column: &mut ColumnBinder<'_>) -> Result<()>;
}

impl<F: RowFetch + ?Sized> RowFetch for &mut F {
    fn fetch(&mut self, columns: &mut [ColumnBinder<'_>]) -> Result<FetchStatus> {
        (**self).fetch(columns)
    }

    fn fetch_column(&mut self, column: &mut ColumnBinder<'_>) -> Result<()> {
        (**self).fetch_column(column)
    }
}

/// Where a column is within the current row fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnState {
    /// Bound, nothing fetched yet for this row.
    Bound,
    /// The row fetch call returned.
    FetchAttempted,
    /// The column value is complete.
    Complete,
    /// The column did not fit its buffer.
    Truncated,
    /// The buffer was grown and the column is being fetched again.
    Refetching,
}

/// Drives a `RowFetch` source over a statement's bindings.
///
/// Containers are bound in column order with `bind` and stay borrowed for
/// the fetcher's lifetime. The current row is readable through `columns`
/// or `current_row`.
///
/// # Example
///
/// ```
/// use mysql_rowbind::mock::MockResultSet;
/// use mysql_rowbind::{BindingTable, FetchOptions, Result, RowFetcher};
///
/// fn main() -> Result<()> {
///     let source = MockResultSet::new()
///         .with_row([Some(7i32.to_ne_bytes().to_vec()), Some(b"a longer title".to_vec())]);
///     let table = BindingTable::with_names(["id", "title"]);
///     let mut id = 0i32;
///     let mut title = String::new();
///
///     let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
///     fetcher.bind(&mut id)?.bind(&mut title)?;
///     while fetcher.next()? {
///         let row = fetcher.current_row();
///         assert_eq!(row.get_by_name("title").and_then(|v| v.as_str()), Some("a longer title"));
///     }
///     drop(fetcher);
///
///     assert_eq!(id, 7);
///     assert_eq!(title, "a longer title");
///     Ok(())
/// }
/// ```
pub struct RowFetcher<'a, F> {
    source: F,
    bindings: &'a BindingTable,
    names: Arc<[String]>,
    binders: Vec<ColumnBinder<'a>>,
    states: Vec<ColumnState>,
    options: FetchOptions,
    rows_fetched: u64,
    exhausted: bool,
}

impl<'a, F: RowFetch> RowFetcher<'a, F> {
    /// Create a fetcher over `bindings` with no columns bound yet.
    pub fn new(source: F, bindings: &'a BindingTable, options: FetchOptions) -> Self {
        let names: Vec<String> = bindings.iter().map(|b| b.name().to_string()).collect();
        Self {
            source,
            bindings,
            names: names.into(),
            binders: Vec::with_capacity(bindings.len()),
            states: Vec::with_capacity(bindings.len()),
            options,
            rows_fetched: 0,
            exhausted: false,
        }
    }

    /// Bind `target` to the next unbound column.
    pub fn bind<T: BindTarget + ?Sized>(&mut self, target: &'a mut T) -> Result<&mut Self> {
        let index = self.binders.len();
        let binding = self.bindings.binding(index)?;
        let mut binder = ColumnBinder::new(target, binding)?;
        if T::IS_DYNAMIC && self.options.initial_capacity > binding.buffer_length() {
            binder.reserve(self.options.initial_capacity)?;
        }
        tracing::trace!(column = index, kind = ?binder.kind(), "bound column");
        self.binders.push(binder);
        self.states.push(ColumnState::Bound);
        Ok(self)
    }

    /// Binders of the bound columns, in column order.
    pub fn columns(&self) -> &[ColumnBinder<'a>] {
        &self.binders
    }

    /// Binder of one column.
    pub fn column(&self, index: usize) -> Result<&ColumnBinder<'a>> {
        self.binders.get(index).ok_or(Error::ColumnIndexOutOfBounds {
            index,
            count: self.binders.len(),
        })
    }

    /// State of one column in the current row fetch.
    pub fn state(&self, index: usize) -> Option<ColumnState> {
        self.states.get(index).copied()
    }

    /// Number of rows fetched so far.
    pub fn rowcount(&self) -> u64 {
        self.rows_fetched
    }

    /// Whether the source has reported the end of the result set.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Options this fetcher runs with.
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch the next row into the bound containers.
    ///
    /// Returns `Ok(false)` once the source has no more rows. Any error
    /// aborts the current row; the containers must not be read as a
    /// complete row afterwards.
    pub fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if self.binders.len() != self.bindings.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.bindings.len(),
                bound: self.binders.len(),
            });
        }

        for binder in &mut self.binders {
            binder.prepare();
        }
        self.set_states(ColumnState::Bound);

        let status = self.source.fetch(&mut self.binders)?;
        self.set_states(ColumnState::FetchAttempted);
        match status {
            FetchStatus::NoData => {
                tracing::trace!(rows = self.rows_fetched, "result set exhausted");
                self.exhausted = true;
                return Ok(false);
            }
            FetchStatus::Truncated if !self.bindings.iter().any(ColumnBinding::is_truncated) => {
                return Err(Error::protocol(
                    "fetch reported truncation but no column is truncated",
                ));
            }
            FetchStatus::Row | FetchStatus::Truncated => {}
        }

        for index in 0..self.binders.len() {
            self.complete_column(index)?;
        }
        for binder in &mut self.binders {
            binder.settle()?;
        }

        self.rows_fetched += 1;
        Ok(true)
    }

    fn complete_column(&mut self, index: usize) -> Result<()> {
        let binder = &mut self.binders[index];
        let binding = binder.binding();
        if !binding.is_truncated() {
            self.states[index] = ColumnState::Complete;
            return Ok(());
        }

        self.states[index] = ColumnState::Truncated;
        let needed = binding.length();
        let available = binding.buffer_length();
        if !binder.is_dynamic() {
            tracing::warn!(column = index, needed, available, "fixed-size column truncated");
            return Err(Error::Truncated {
                column: index,
                needed,
                available,
            });
        }
        if needed > self.options.max_column_length {
            return Err(Error::ColumnTooLarge {
                column: index,
                length: needed,
                limit: self.options.max_column_length,
            });
        }

        binder.resize()?;
        self.states[index] = ColumnState::Refetching;
        binder.prepare();
        self.source.fetch_column(binder)?;
        if binding.is_truncated() {
            return Err(Error::protocol(format!(
                "column {index} still truncated after resize to {needed} bytes (now {})",
                binding.length()
            )));
        }

        self.states[index] = ColumnState::Complete;
        Ok(())
    }

    fn set_states(&mut self, state: ColumnState) {
        for s in &mut self.states {
            *s = state;
        }
    }

    /// Copy the current row out of the bound containers.
    pub fn current_row(&self) -> Row {
        let values = self
            .binders
            .iter()
            .map(|b| ColumnValue::from(b.value()))
            .collect();
        Row::new(values, Arc::clone(&self.names))
    }

    /// Fetch all remaining rows as owned copies.
    pub fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while self.next()? {
            rows.push(self.current_row());
        }
        Ok(rows)
    }

    /// Release the bound containers and return the source.
    pub fn into_source(self) -> F {
        self.source
    }
}
