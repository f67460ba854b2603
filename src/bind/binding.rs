//! Per-column binding records.
//!
//! A `ColumnBinding` is the output descriptor of one result column: the
//! capacity of the bound buffer, plus the actual length, NULL and truncation
//! indicators reported back for each row. The records live in a
//! statement-owned `BindingTable`; binders only borrow them. The buffer
//! itself is reached through the `ColumnBinder` that owns the borrow of the
//! container, never through the table.

use std::cell::Cell;

use crate::error::{Error, Result};

/// Output binding for one result column.
///
/// All fields use `Cell`, so the record can be shared between its binder and
/// the fetch loop while staying on a single thread.
#[derive(Debug)]
pub struct ColumnBinding {
    index: usize,
    name: String,
    buffer_length: Cell<usize>,
    length: Cell<usize>,
    is_null: Cell<bool>,
    truncated: Cell<bool>,
    attached: Cell<bool>,
}

impl ColumnBinding {
    fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            buffer_length: Cell::new(0),
            length: Cell::new(0),
            is_null: Cell::new(false),
            truncated: Cell::new(false),
            attached: Cell::new(false),
        }
    }

    /// Column position in the result set (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Column name, empty if the table was created without names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity of the bound buffer in bytes (0 while detached).
    pub fn buffer_length(&self) -> usize {
        self.buffer_length.get()
    }

    /// Actual length of the column reported by the last fetch.
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Whether the last fetch reported NULL.
    pub fn is_null(&self) -> bool {
        self.is_null.get()
    }

    /// Whether the last fetch reported more data than the buffer holds.
    pub fn is_truncated(&self) -> bool {
        self.truncated.get()
    }

    /// Whether a binder currently owns the buffer.
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Record a fetched value of `length` bytes against the bound capacity.
    pub(crate) fn record(&self, length: usize) {
        self.is_null.set(false);
        self.length.set(length);
        self.truncated.set(length > self.buffer_length.get());
    }

    pub(crate) fn record_null(&self) {
        self.is_null.set(true);
        self.length.set(0);
        self.truncated.set(false);
    }

    pub(crate) fn attach(&self) -> Result<()> {
        if self.attached.replace(true) {
            return Err(Error::AlreadyBound { column: self.index });
        }
        Ok(())
    }

    pub(crate) fn detach(&self) {
        self.buffer_length.set(0);
        self.attached.set(false);
    }

    pub(crate) fn set_buffer_length(&self, length: usize) {
        self.buffer_length.set(length);
    }

    /// Clear per-row indicators before a fetch.
    pub(crate) fn reset(&self) {
        self.length.set(0);
        self.is_null.set(false);
        self.truncated.set(false);
    }
}

/// The statement's binding table: one `ColumnBinding` per result column.
#[derive(Debug)]
pub struct BindingTable {
    bindings: Vec<ColumnBinding>,
}

impl BindingTable {
    /// Create a table of `count` unnamed bindings.
    pub fn new(count: usize) -> Self {
        Self {
            bindings: (0..count)
                .map(|i| ColumnBinding::new(i, String::new()))
                .collect(),
        }
    }

    /// Create a table with one binding per column name.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bindings: names
                .into_iter()
                .enumerate()
                .map(|(i, name)| ColumnBinding::new(i, name.into()))
                .collect(),
        }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get binding by index.
    pub fn get(&self, index: usize) -> Option<&ColumnBinding> {
        self.bindings.get(index)
    }

    /// Get binding by index, or an out-of-bounds error.
    pub fn binding(&self, index: usize) -> Result<&ColumnBinding> {
        self.bindings
            .get(index)
            .ok_or(Error::ColumnIndexOutOfBounds {
                index,
                count: self.bindings.len(),
            })
    }

    /// Iterate over bindings in column order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnBinding> {
        self.bindings.iter()
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.name()).collect()
    }

    /// Find column index by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let name_upper = name.to_uppercase();
        self.bindings
            .iter()
            .position(|b| b.name.to_uppercase() == name_upper)
    }
}

impl<'a> IntoIterator for &'a BindingTable {
    type Item = &'a ColumnBinding;
    type IntoIter = std::slice::Iter<'a, ColumnBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}
