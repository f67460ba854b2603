//! Column binders: growable and fixed-size output storage.
//!
//! A `ColumnBinder` attaches a caller-owned container to a `ColumnBinding`.
//! Text and byte containers can grow when the fetch call reports a value
//! longer than the bound buffer; fixed-size scalars cannot, and asking them
//! to is a logic error.

use std::iter;
use std::mem;
use std::slice;
use std::str::{self, Utf8Error};

use crate::error::{Error, Result};

use super::binding::ColumnBinding;

/// Kind of storage behind a column binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Fixed-size value; never resized.
    FixedScalar,
    /// Growable UTF-8 text.
    GrowableText,
    /// Growable byte sequence.
    GrowableBytes,
}

impl ColumnKind {
    /// Whether storage of this kind can grow after a truncated fetch.
    pub fn is_dynamic(self) -> bool {
        !matches!(self, ColumnKind::FixedScalar)
    }
}

/// Borrowed storage a binder writes column data into.
#[derive(Debug)]
pub enum Backing<'a> {
    /// Fixed-size memory, written in place.
    FixedScalar(&'a mut [u8]),
    /// Growable text. Content is validated as UTF-8 before it is exposed.
    GrowableText(&'a mut String),
    /// Growable byte sequence.
    GrowableBytes(&'a mut Vec<u8>),
}

impl Backing<'_> {
    /// Kind of this backing.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Backing::FixedScalar(_) => ColumnKind::FixedScalar,
            Backing::GrowableText(_) => ColumnKind::GrowableText,
            Backing::GrowableBytes(_) => ColumnKind::GrowableBytes,
        }
    }
}

/// A type that can receive a result column.
///
/// `IS_DYNAMIC` is known without creating a binder, so row-fetch code can
/// decide up front whether a truncated column is recoverable.
pub trait BindTarget {
    /// Whether the storage grows to fit long values.
    const IS_DYNAMIC: bool;

    /// Borrow the storage for binding.
    fn backing(&mut self) -> Backing<'_>;
}

impl BindTarget for String {
    const IS_DYNAMIC: bool = true;

    fn backing(&mut self) -> Backing<'_> {
        Backing::GrowableText(self)
    }
}

impl BindTarget for Vec<u8> {
    const IS_DYNAMIC: bool = true;

    fn backing(&mut self) -> Backing<'_> {
        Backing::GrowableBytes(self)
    }
}

impl<const N: usize> BindTarget for [u8; N] {
    const IS_DYNAMIC: bool = false;

    fn backing(&mut self) -> Backing<'_> {
        Backing::FixedScalar(&mut self[..])
    }
}

macro_rules! impl_fixed_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BindTarget for $ty {
                const IS_DYNAMIC: bool = false;

                fn backing(&mut self) -> Backing<'_> {
                    // SAFETY: primitive numbers have no padding and every
                    // bit pattern is a valid value.
                    let bytes = unsafe {
                        slice::from_raw_parts_mut(
                            (self as *mut $ty).cast::<u8>(),
                            mem::size_of::<$ty>(),
                        )
                    };
                    Backing::FixedScalar(bytes)
                }
            }
        )*
    };
}

impl_fixed_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Borrowed view of a bound column's current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'r> {
    /// Raw bytes of a fixed-size value, in native byte order.
    Fixed(&'r [u8]),
    /// Text value.
    Text(&'r str),
    /// Byte sequence value.
    Bytes(&'r [u8]),
}

/// Binds one caller-owned container to one column binding.
///
/// The binder borrows the container mutably and the binding shared; both
/// must outlive it. It is the only way to reach the container: the fetch
/// side writes column data through `store` and `store_null`, which copy at
/// most the bound capacity and record the actual length. Dropping the
/// binder detaches the binding.
#[derive(Debug)]
pub struct ColumnBinder<'a> {
    binding: &'a ColumnBinding,
    backing: Backing<'a>,
    invalid_text: Option<Utf8Error>,
}

impl<'a> ColumnBinder<'a> {
    /// Attach `target` to `binding`.
    ///
    /// Growable containers are emptied and bound at their current capacity.
    pub fn new<T: BindTarget + ?Sized>(
        target: &'a mut T,
        binding: &'a ColumnBinding,
    ) -> Result<Self> {
        binding.attach()?;
        let mut binder = Self {
            binding,
            backing: target.backing(),
            invalid_text: None,
        };
        binder.bind_storage();
        Ok(binder)
    }

    fn bind_storage(&mut self) {
        let capacity = match &mut self.backing {
            Backing::FixedScalar(bytes) => bytes.len(),
            Backing::GrowableText(s) => {
                s.clear();
                s.capacity()
            }
            Backing::GrowableBytes(v) => {
                v.clear();
                v.capacity()
            }
        };
        self.binding.set_buffer_length(capacity);
    }

    /// Kind of the bound storage.
    pub fn kind(&self) -> ColumnKind {
        self.backing.kind()
    }

    /// Whether the bound storage can grow.
    pub fn is_dynamic(&self) -> bool {
        self.kind().is_dynamic()
    }

    /// The binding this binder reports through.
    pub fn binding(&self) -> &'a ColumnBinding {
        self.binding
    }

    /// Column index of the binding.
    pub fn index(&self) -> usize {
        self.binding.index()
    }

    /// Address of the bound storage.
    pub fn buffer(&self) -> *const u8 {
        match &self.backing {
            Backing::FixedScalar(bytes) => bytes.as_ptr(),
            Backing::GrowableText(s) => s.as_ptr(),
            Backing::GrowableBytes(v) => v.as_ptr(),
        }
    }

    /// Bound capacity in bytes.
    pub fn buffer_length(&self) -> usize {
        self.binding.buffer_length()
    }

    /// Receive one column value from the fetch.
    ///
    /// At most the bound capacity is copied; the full length of `data` is
    /// recorded as the actual length, so a longer value marks the column
    /// truncated. Growable containers never reallocate here. Text bytes
    /// are checked before they enter the `String`: an invalid sequence
    /// keeps only its valid prefix and fails the next `settle`.
    pub fn store(&mut self, data: &[u8]) {
        let n = data.len().min(self.binding.buffer_length());
        let written = &data[..n];
        self.invalid_text = None;
        match &mut self.backing {
            Backing::FixedScalar(bytes) => bytes[..n].copy_from_slice(written),
            Backing::GrowableText(s) => {
                s.clear();
                match str::from_utf8(written) {
                    Ok(text) => s.push_str(text),
                    Err(err) => {
                        if let Ok(prefix) = str::from_utf8(&written[..err.valid_up_to()]) {
                            s.push_str(prefix);
                        }
                        self.invalid_text = Some(err);
                    }
                }
            }
            Backing::GrowableBytes(v) => {
                v.clear();
                v.extend_from_slice(written);
            }
        }
        self.binding.record(data.len());
    }

    /// Receive a NULL column value from the fetch.
    pub fn store_null(&mut self) {
        self.clear();
        self.invalid_text = None;
        self.binding.record_null();
    }

    /// Make sure a growable container can take at least `capacity` bytes
    /// before the first fetch. Fixed-size storage is left alone.
    ///
    /// On allocation failure the container and binding are unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        let column = self.index();
        let alloc_err = |source| Error::AllocationFailed {
            column,
            requested: capacity,
            source,
        };
        match &mut self.backing {
            Backing::FixedScalar(_) => return Ok(()),
            Backing::GrowableText(s) => s.try_reserve_exact(capacity).map_err(alloc_err)?,
            Backing::GrowableBytes(v) => v.try_reserve_exact(capacity).map_err(alloc_err)?,
        }
        self.bind_storage();
        Ok(())
    }

    /// Grow the container to the length reported by the last fetch and
    /// rebind the buffer to it.
    ///
    /// Only valid after the fetch reported truncation: the reported length
    /// must be strictly greater than the bound capacity. Fixed-size storage
    /// never resizes. Both violations return `Error::UnexpectedResize` and
    /// leave the container and binding untouched, as does a failed
    /// allocation.
    #[track_caller]
    pub fn resize(&mut self) -> Result<()> {
        let binding = self.binding;
        let column = binding.index();
        let length = binding.length();
        let previous = binding.buffer_length();

        if !self.is_dynamic() {
            return Err(Error::unexpected_resize(
                column,
                "fixed-size storage cannot grow",
            ));
        }
        if length <= previous {
            return Err(Error::unexpected_resize(
                column,
                format!("reported length {length} does not exceed bound capacity {previous}"),
            ));
        }

        let alloc_err = |source| Error::AllocationFailed {
            column,
            requested: length,
            source,
        };
        match &mut self.backing {
            Backing::FixedScalar(_) => {}
            Backing::GrowableText(s) => {
                s.try_reserve_exact(length.saturating_sub(s.len()))
                    .map_err(alloc_err)?;
                s.clear();
                s.extend(iter::repeat('\0').take(length));
            }
            Backing::GrowableBytes(v) => {
                v.try_reserve_exact(length.saturating_sub(v.len()))
                    .map_err(alloc_err)?;
                v.clear();
                v.resize(length, 0);
            }
        }
        binding.set_buffer_length(length);

        tracing::debug!(column, from = previous, to = length, "resized column buffer");
        Ok(())
    }

    /// Empty a growable container ahead of a fetch or re-fetch.
    ///
    /// Storage and the bound capacity are kept, so the binding stays valid.
    pub fn prepare(&mut self) {
        self.clear();
        self.invalid_text = None;
        self.binding.reset();
    }

    /// Check the fetched value once the row is complete.
    ///
    /// Text that is not valid UTF-8 is rejected and the container is left
    /// empty. A fixed-size value must fill its storage exactly.
    pub fn settle(&mut self) -> Result<()> {
        let binding = self.binding;
        let column = binding.index();
        if binding.is_truncated() {
            return Err(Error::protocol(format!(
                "column {column} is still truncated ({} of {} bytes)",
                binding.buffer_length(),
                binding.length()
            )));
        }
        if binding.is_null() {
            self.clear();
            self.invalid_text = None;
            return Ok(());
        }
        if let Some(source) = self.invalid_text.take() {
            self.clear();
            return Err(Error::InvalidText { column, source });
        }
        if let Backing::FixedScalar(bytes) = &self.backing {
            let length = binding.length();
            if length != bytes.len() {
                return Err(Error::protocol(format!(
                    "column {column} reported {length} bytes for {}-byte fixed-size storage",
                    bytes.len()
                )));
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        match &mut self.backing {
            Backing::FixedScalar(_) => {}
            Backing::GrowableText(s) => s.clear(),
            Backing::GrowableBytes(v) => v.clear(),
        }
    }

    /// Current value, or `None` if the last fetch reported NULL.
    pub fn value(&self) -> Option<ValueRef<'_>> {
        if self.binding.is_null() {
            return None;
        }
        Some(match &self.backing {
            Backing::FixedScalar(bytes) => ValueRef::Fixed(bytes),
            Backing::GrowableText(s) => ValueRef::Text(s.as_str()),
            Backing::GrowableBytes(v) => ValueRef::Bytes(v.as_slice()),
        })
    }
}

impl Drop for ColumnBinder<'_> {
    fn drop(&mut self) {
        self.binding.detach();
    }
}
