mod access;
mod coerce;
mod compare;
mod hash;
mod rank;
mod tag;

#[cfg(test)]
mod tests;

use crate::{
    INLINE_CAPACITY, MAX_REFERENCE_BYTES,
    error::{ContractViolation, contract_violation},
    range::Range,
};
use floedb_pack::{Builder, PackError, Slice};
use std::{fmt, marker::PhantomData, ptr::NonNull};

// re-exports
pub use compare::StringOrder;
pub use tag::StorageTag;

///
/// Value
///
/// Fixed-size (16 byte) handle for one query value. It either owns its
/// encoding (inline or in an external buffer), borrows an item owned by
/// someone else, or holds a lazy integer [`Range`].
///
/// Dropping an owning value releases its storage; borrowed values never
/// release what they point at. `Clone` always yields an independent value
/// with the same storage kind.
///

#[derive(Clone, Default)]
pub struct Value<'a> {
    repr: Repr<'a>,
}

///
/// Repr
///

#[derive(Clone)]
#[allow(clippy::box_collection)] // thin pointer keeps the value at 16 bytes
enum Repr<'a> {
    /// Small encoded item, zero padded.
    Internal([u8; INLINE_CAPACITY]),

    /// Owned encoding larger than the inline capacity.
    External(Box<Vec<u8>>),

    /// Borrowed item.
    Reference {
        ptr: NonNull<u8>,
        len: u32,
        _marker: PhantomData<&'a [u8]>,
    },

    /// Borrowed item that must keep pointing at the same memory.
    ReferenceSticky {
        ptr: NonNull<u8>,
        len: u32,
        _marker: PhantomData<&'a [u8]>,
    },

    Range(Box<Range>),
}

impl Default for Repr<'_> {
    fn default() -> Self {
        inline_repr(Slice::none().as_bytes())
    }
}

const _: () = assert!(std::mem::size_of::<Value<'static>>() == 16);

// SAFETY: the borrowed variants only ever hold a pointer derived from a
// `&'a [u8]`, which is itself `Send + Sync`; every other variant is owned data.
unsafe impl Send for Value<'_> {}

// SAFETY: see `Send`; shared access never mutates the pointed-at bytes.
unsafe impl Sync for Value<'_> {}

///
/// BorrowKind
///
/// Selects which reference variant a borrowing constructor produces.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BorrowKind {
    #[default]
    Reference,
    Sticky,
}

fn inline_repr<'a>(bytes: &[u8]) -> Repr<'a> {
    let mut buf = [0u8; INLINE_CAPACITY];
    buf[..bytes.len()].copy_from_slice(bytes);

    Repr::Internal(buf)
}

impl<'a> Value<'a> {
    ///
    /// CONSTRUCTORS
    ///

    /// The empty value; no storage is held.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn null() -> Self {
        Self::from_slice(Slice::null())
    }

    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        Self::from_scalar(|b| {
            b.add_bool(value);
        })
    }

    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Self::from_scalar(|b| {
            b.add_i64(value);
        })
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self::from_scalar(|b| {
            b.add_u64(value);
        })
    }

    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self::from_scalar(|b| {
            b.add_f64(value);
        })
    }

    #[must_use]
    pub fn from_text(value: &str) -> Self {
        Self::from_scalar(|b| {
            b.add_str(value);
        })
    }

    // A single top-level scalar always leaves the builder closed.
    fn from_scalar(write: impl FnOnce(&mut Builder)) -> Self {
        let mut builder = Builder::with_capacity(INLINE_CAPACITY);
        write(&mut builder);

        builder.slice().map_or_else(|_| Self::none(), Self::from_slice)
    }

    /// Copy an encoded item, inline when it fits.
    #[must_use]
    pub fn from_slice(slice: Slice<'_>) -> Self {
        let bytes = slice.as_bytes();
        if bytes.len() <= INLINE_CAPACITY {
            return Self {
                repr: inline_repr(bytes),
            };
        }

        tracing::trace!(bytes = bytes.len(), "value spilled to external buffer");
        Self {
            repr: Repr::External(Box::new(bytes.to_vec())),
        }
    }

    /// Take ownership of an encoded buffer without copying it.
    ///
    /// Only the first item is kept; an invalid buffer is rejected.
    pub fn from_buffer(mut buffer: Vec<u8>) -> Result<Self, PackError> {
        let len = Slice::new(&buffer)?.byte_size();
        if len <= INLINE_CAPACITY {
            return Ok(Self {
                repr: inline_repr(&buffer[..len]),
            });
        }

        buffer.truncate(len);
        tracing::trace!(bytes = len, "value adopted external buffer");

        Ok(Self {
            repr: Repr::External(Box::new(buffer)),
        })
    }

    /// Copy the item a builder has produced.
    pub fn from_builder(builder: &Builder) -> Result<Self, PackError> {
        Ok(Self::from_slice(builder.slice()?))
    }

    /// Encode any serde value.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self, PackError> {
        Self::from_buffer(Builder::from_serialize(value)?.finish()?)
    }

    /// Borrow an item owned elsewhere.
    ///
    /// Panics with a contract violation when the item is larger than
    /// [`MAX_REFERENCE_BYTES`].
    #[must_use]
    #[track_caller]
    pub fn reference(slice: Slice<'a>) -> Self {
        Self::from_slice_with(slice, BorrowKind::Reference)
    }

    /// Borrow a document item that stays pinned for the snapshot.
    #[must_use]
    #[track_caller]
    pub fn document(slice: Slice<'a>) -> Self {
        Self::from_slice_with(slice, BorrowKind::Sticky)
    }

    /// Borrow an item without copying; the caller picks the strategy.
    #[must_use]
    #[track_caller]
    pub fn from_slice_with(slice: Slice<'a>, kind: BorrowKind) -> Self {
        let bytes = slice.as_bytes();
        let Ok(len) = u32::try_from(bytes.len()) else {
            contract_violation(ContractViolation::ReferenceTooLarge {
                len: bytes.len(),
                max: MAX_REFERENCE_BYTES,
            })
        };
        let ptr = NonNull::from(bytes).cast::<u8>();

        let repr = match kind {
            BorrowKind::Reference => Repr::Reference {
                ptr,
                len,
                _marker: PhantomData,
            },
            BorrowKind::Sticky => Repr::ReferenceSticky {
                ptr,
                len,
                _marker: PhantomData,
            },
        };

        Self { repr }
    }

    /// Lazy integer range `[low, high]`.
    #[must_use]
    pub fn from_range(low: i64, high: i64) -> Self {
        Range::new(low, high).into()
    }

    pub(crate) fn from_boxed_range(range: Box<Range>) -> Self {
        Self {
            repr: Repr::Range(range),
        }
    }

    ///
    /// STORAGE
    ///

    #[must_use]
    pub const fn storage(&self) -> StorageTag {
        match self.repr {
            Repr::Internal(_) => StorageTag::Internal,
            Repr::External(_) => StorageTag::External,
            Repr::Reference { .. } => StorageTag::Reference,
            Repr::ReferenceSticky { .. } => StorageTag::ReferenceSticky,
            Repr::Range(_) => StorageTag::Range,
        }
    }

    /// The encoded item this value denotes. Ranges have no encoding and
    /// yield the `none` slice.
    #[must_use]
    pub fn slice(&self) -> Slice<'_> {
        match &self.repr {
            Repr::Internal(bytes) => Slice::new(bytes).unwrap_or_else(|_| Slice::none()),
            Repr::External(buffer) => Slice::from_trusted(buffer),
            Repr::Reference { ptr, len, .. } | Repr::ReferenceSticky { ptr, len, .. } => {
                // SAFETY: `ptr` and `len` come from a `&'a [u8]` taken at
                // construction, and `'a` outlives the `&self` borrow here.
                let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), *len as usize) };

                Slice::from_trusted(bytes)
            }
            Repr::Range(_) => Slice::none(),
        }
    }

    #[must_use]
    pub fn try_range(&self) -> Option<&Range> {
        match &self.repr {
            Repr::Range(range) => Some(&**range),
            _ => None,
        }
    }

    /// The held range; calling this on any other storage is a contract
    /// violation.
    #[must_use]
    #[track_caller]
    pub fn range(&self) -> &Range {
        match &self.repr {
            Repr::Range(range) => &**range,
            _ => contract_violation(ContractViolation::NotARange {
                storage: self.storage().label(),
            }),
        }
    }

    /// Move the value out, leaving `none` behind.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Release any held storage; the value becomes `none`.
    pub fn erase(&mut self) {
        *self = Self::none();
    }

    /// Copy into a value that owns its storage. Ranges stay ranges.
    #[must_use]
    pub fn to_owned_value(&self) -> Value<'static> {
        match &self.repr {
            Repr::Range(range) => Value::from_boxed_range(range.clone()),
            _ => Value::from_slice(self.slice()),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("storage", &self.storage().label())
            .field("value", &format_args!("{self}"))
            .finish()
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Range(range) => write!(f, "{}..{}", range.low(), range.high()),
            _ => write!(f, "{}", self.slice()),
        }
    }
}

///
/// CONVERSIONS
///

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl From<i64> for Value<'_> {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<u64> for Value<'_> {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<&str> for Value<'_> {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<Range> for Value<'_> {
    fn from(range: Range) -> Self {
        Self::from_boxed_range(Box::new(range))
    }
}
