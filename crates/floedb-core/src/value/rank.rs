use floedb_pack::SliceType;

///
/// TypeRank
///
/// Cross-type ordering used by the comparator. `none` ranks with `null`,
/// ranges rank with arrays.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) enum TypeRank {
    Null,
    Bool,
    Number,
    String,
    Binary,
    Array,
    Object,
}

impl TypeRank {
    pub(crate) const fn of(kind: SliceType) -> Self {
        match kind {
            SliceType::None | SliceType::Null => Self::Null,
            SliceType::Bool => Self::Bool,
            SliceType::Int | SliceType::Double => Self::Number,
            SliceType::String => Self::String,
            SliceType::Binary => Self::Binary,
            SliceType::Array => Self::Array,
            SliceType::Object => Self::Object,
        }
    }
}
