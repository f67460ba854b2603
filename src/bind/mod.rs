//! Column bindings and the binders that grow them.

mod binding;
mod storage;

pub use binding::{BindingTable, ColumnBinding};
pub use storage::{Backing, BindTarget, ColumnBinder, ColumnKind, ValueRef};
