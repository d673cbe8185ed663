///
/// StorageTag
///
/// Storage kind of a [`Value`](super::Value).
///
/// Discriminants are stable and feed the value hash, so reordering them
/// changes every hash.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum StorageTag {
    Internal = 0,
    External = 1,
    Reference = 2,
    ReferenceSticky = 3,
    Range = 4,
}

impl StorageTag {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Reference => "reference",
            Self::ReferenceSticky => "reference_sticky",
            Self::Range => "range",
        }
    }

    /// Whether dropping a value of this kind releases memory.
    #[must_use]
    pub const fn owns_heap(self) -> bool {
        matches!(self, Self::External | Self::Range)
    }

    /// Whether the value points at memory it does not own.
    #[must_use]
    pub const fn is_borrowed(self) -> bool {
        matches!(self, Self::Reference | Self::ReferenceSticky)
    }
}
