//! Compatibility shim for the previous value representation.

use crate::{
    block::RowBlock,
    error::InternalError,
    range::Range,
    value::{StringOrder, Value},
};
use floedb_pack::Slice;
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
    ptr,
};

///
/// DocumentMarker
///
/// Opaque handle of a stored document, resolved through a
/// [`DocumentSource`].
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DocumentMarker(pub u64);

///
/// DocumentSource
///
/// Document storage as seen by the value layer. Resolved bytes stay valid
/// and unchanged for as long as the source is borrowed.
///

pub trait DocumentSource {
    fn resolve(&self, marker: DocumentMarker) -> Option<Slice<'_>>;
}

///
/// LegacyValue
///
/// Previous variable-size value. Owned payloads are freed by `Drop`; move
/// them out with [`Value::from_legacy`] instead of the old erase/destroy
/// pair.
///

#[derive(Debug, Default)]
#[allow(clippy::box_collection)] // keeps the legacy payloads behind one pointer
pub enum LegacyValue<'a> {
    #[default]
    Empty,
    Json(Box<serde_json::Value>),
    Shaped(DocumentMarker),
    DocVec(Box<Vec<RowBlock<'a>>>),
    Range(Box<Range>),
}

impl LegacyValue<'_> {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Json(_) => "json",
            Self::Shaped(_) => "shaped",
            Self::DocVec(_) => "docvec",
            Self::Range(_) => "range",
        }
    }

    /// Whether dropping this value releases a heap allocation.
    #[must_use]
    pub const fn owns_heap(&self) -> bool {
        matches!(self, Self::Json(_) | Self::DocVec(_) | Self::Range(_))
    }

    const fn discriminant(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Json(_) => 1,
            Self::Shaped(_) => 2,
            Self::DocVec(_) => 3,
            Self::Range(_) => 4,
        }
    }

    /// Order two legacy values by converting both with
    /// [`Value::from_legacy_ref`].
    pub fn compare<D>(
        left: &Self,
        right: &Self,
        source: &D,
        order: StringOrder,
    ) -> Result<Ordering, InternalError>
    where
        D: DocumentSource + ?Sized,
    {
        let left = Value::from_legacy_ref(left, source)?;
        let right = Value::from_legacy_ref(right, source)?;

        Ok(Value::compare(&left, &right, order))
    }
}

///
/// Identity
///
/// Legacy values are equal only when they share the same owned allocation
/// (or the same document marker).
///

impl PartialEq for LegacyValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Json(a), Self::Json(b)) => ptr::eq(&**a, &**b),
            (Self::Shaped(a), Self::Shaped(b)) => a == b,
            (Self::DocVec(a), Self::DocVec(b)) => ptr::eq(&**a, &**b),
            (Self::Range(a), Self::Range(b)) => ptr::eq(&**a, &**b),
            _ => false,
        }
    }
}

impl Eq for LegacyValue<'_> {}

impl Hash for LegacyValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.discriminant());

        match self {
            Self::Empty => {}
            Self::Json(json) => ptr::from_ref(&**json).addr().hash(state),
            Self::Shaped(marker) => marker.hash(state),
            Self::DocVec(blocks) => ptr::from_ref(&**blocks).addr().hash(state),
            Self::Range(range) => ptr::from_ref(&**range).addr().hash(state),
        }
    }
}

///
/// Conversion
///

impl<'a> Value<'a> {
    /// Convert a legacy value, taking over its owned payloads.
    ///
    /// `Shaped` documents become sticky references into `source`; an
    /// unknown marker is a not-found error. `DocVec` collapses to an array
    /// of register 0.
    pub fn from_legacy<D>(legacy: LegacyValue<'_>, source: &'a D) -> Result<Self, InternalError>
    where
        D: DocumentSource + ?Sized,
    {
        match legacy {
            LegacyValue::Range(range) => {
                tracing::debug!(low = range.low(), high = range.high(), "legacy range moved");
                Ok(Self::from_boxed_range(range))
            }
            other => Self::from_legacy_ref(&other, source),
        }
    }

    /// Convert a legacy value without consuming it. Owned payloads are
    /// copied.
    pub fn from_legacy_ref<D>(
        legacy: &LegacyValue<'_>,
        source: &'a D,
    ) -> Result<Self, InternalError>
    where
        D: DocumentSource + ?Sized,
    {
        tracing::debug!(kind = legacy.type_name(), "converting legacy value");

        match legacy {
            LegacyValue::Empty => Ok(Self::none()),
            LegacyValue::Json(json) => Ok(Self::from_serialize(&**json)?),
            LegacyValue::Shaped(marker) => source
                .resolve(*marker)
                .map(Self::document)
                .ok_or_else(|| {
                    InternalError::legacy_not_found(format!("document {} not found", marker.0))
                }),
            LegacyValue::DocVec(blocks) => Self::from_blocks_register(blocks, 0),
            LegacyValue::Range(range) => Ok(Self::from(**range)),
        }
    }
}

///
/// TESTS
///
