//! Owned column values.

use std::fmt;

use crate::bind::ValueRef;

/// An owned copy of one column value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// NULL value.
    Null,
    /// Text value.
    Text(String),
    /// Byte sequence value.
    Bytes(Vec<u8>),
    /// Fixed-size value as raw native-endian bytes.
    Fixed(Vec<u8>),
}

impl ColumnValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    ///
    /// Text values are returned as their UTF-8 bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Null => None,
            ColumnValue::Text(s) => Some(s.as_bytes()),
            ColumnValue::Bytes(b) | ColumnValue::Fixed(b) => Some(b),
        }
    }

    /// Length of the value in bytes (0 for NULL).
    pub fn len(&self) -> usize {
        self.as_bytes().map_or(0, <[u8]>::len)
    }

    /// Check if the value is NULL or has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Option<ValueRef<'_>>> for ColumnValue {
    fn from(value: Option<ValueRef<'_>>) -> Self {
        match value {
            None => ColumnValue::Null,
            Some(ValueRef::Text(s)) => ColumnValue::Text(s.to_owned()),
            Some(ValueRef::Bytes(b)) => ColumnValue::Bytes(b.to_vec()),
            Some(ValueRef::Fixed(b)) => ColumnValue::Fixed(b.to_vec()),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => write!(f, "NULL"),
            ColumnValue::Text(s) => write!(f, "{}", s),
            ColumnValue::Bytes(b) => write!(f, "<BYTES: {} bytes>", b.len()),
            ColumnValue::Fixed(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}
