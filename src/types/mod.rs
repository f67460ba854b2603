//! Owned row data for fetched results.

mod row;
mod value;

pub use row::Row;
pub use value::ColumnValue;
