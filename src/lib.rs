//! Growable output buffers for MySQL prepared-statement row fetches.
//!
//! The binary protocol fetches each row into caller-supplied buffers and
//! reports the real length of every column. When a text or blob column is
//! longer than its buffer the value is truncated, and the caller has to grow
//! the buffer and fetch that column again. This crate does that dance for
//! `String` and `Vec<u8>` columns, and refuses to for fixed-size scalars,
//! where truncation is a terminal error.
//!
//! # Example
//!
//! ```
//! use mysql_rowbind::mock::MockResultSet;
//! use mysql_rowbind::{BindingTable, FetchOptions, Result, RowFetcher};
//!
//! fn main() -> Result<()> {
//!     // Stands in for the client library's statement fetch.
//!     let source = MockResultSet::new()
//!         .with_row([Some(b"first".to_vec()), Some(vec![0xde, 0xad, 0xbe, 0xef])])
//!         .with_row([Some(b"second, and quite a bit longer".to_vec()), None]);
//!
//!     let table = BindingTable::with_names(["name", "payload"]);
//!     let mut name = String::new();
//!     let mut payload = Vec::new();
//!
//!     let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
//!     fetcher.bind(&mut name)?.bind(&mut payload)?;
//!
//!     let rows = fetcher.fetch_all()?;
//!     assert_eq!(rows.len(), 2);
//!     assert_eq!(rows[1].get(0).and_then(|v| v.as_str()), Some("second, and quite a bit longer"));
//!     assert!(rows[1].get_by_name("payload").unwrap().is_null());
//!     Ok(())
//! }
//! ```

pub mod bind;
pub mod error;
pub mod fetch;
pub mod mock;
pub mod options;
pub mod types;

// Re-export main types
pub use bind::{
    Backing, BindTarget, BindingTable, ColumnBinder, ColumnBinding, ColumnKind, ValueRef,
};
pub use error::{Error, Result};
pub use fetch::{ColumnState, FetchStatus, RowFetch, RowFetcher};
pub use options::FetchOptions;
pub use types::{ColumnValue, Row};
