use super::{Value, rank::TypeRank};
use crate::range::Range;
use floedb_pack::{ArrayIter, Number, Slice};
use std::{borrow::Cow, cmp::Ordering, collections::BTreeSet, ops::RangeInclusive};

///
/// StringOrder
///
/// How strings compare. `Binary` orders by UTF-8 bytes; `Collated` orders
/// case-insensitively first and breaks ties by bytes, so it stays total.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StringOrder {
    #[default]
    Binary,
    Collated,
}

impl Value<'_> {
    /// Total order over values.
    ///
    /// Types order `null` (and `none`) < bool < number < string < binary <
    /// array (and range) < object. Within a type: numbers by numeric value,
    /// arrays element-wise then by length, objects over the sorted union of
    /// their keys with missing members reading as `null`.
    #[must_use]
    pub fn compare(left: &Value<'_>, right: &Value<'_>, order: StringOrder) -> Ordering {
        cmp_operands(Operand::of(left), Operand::of(right), order)
    }

    /// [`Value::compare`] with binary string order.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Value<'_>) -> Ordering {
        Self::compare(self, other, StringOrder::Binary)
    }
}

///
/// Operand
///
/// Comparable view: an encoded item, a range element, or a whole range.
///

#[derive(Clone, Copy)]
enum Operand<'a> {
    Slice(Slice<'a>),
    Int(i64),
    Range(&'a Range),
}

impl<'a> Operand<'a> {
    fn of(value: &'a Value<'_>) -> Self {
        match value.try_range() {
            Some(range) => Self::Range(range),
            None => Self::Slice(value.slice()),
        }
    }

    fn rank(self) -> TypeRank {
        match self {
            Self::Slice(slice) => TypeRank::of(slice.slice_type()),
            Self::Int(_) => TypeRank::Number,
            Self::Range(_) => TypeRank::Array,
        }
    }

    fn slice(self) -> Slice<'a> {
        match self {
            Self::Slice(slice) => slice,
            Self::Int(_) | Self::Range(_) => Slice::none(),
        }
    }

    fn number(self) -> Option<Number> {
        match self {
            Self::Slice(slice) => slice.number(),
            Self::Int(i) => Some(Number::Int(i128::from(i))),
            Self::Range(_) => None,
        }
    }

    fn len(self) -> usize {
        match self {
            Self::Slice(slice) => slice.length(),
            Self::Int(_) => 0,
            Self::Range(range) => range.size(),
        }
    }

    fn elements(self) -> Elements<'a> {
        match self {
            Self::Slice(slice) => Elements::Slice(slice.array_iter()),
            Self::Int(_) => Elements::Slice(Slice::none().array_iter()),
            Self::Range(range) => Elements::Range(range.iter()),
        }
    }
}

enum Elements<'a> {
    Slice(ArrayIter<'a>),
    Range(RangeInclusive<i64>),
}

impl<'a> Iterator for Elements<'a> {
    type Item = Operand<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Slice(iter) => iter.next().map(Operand::Slice),
            Self::Range(iter) => iter.next().map(Operand::Int),
        }
    }
}

fn cmp_operands(left: Operand<'_>, right: Operand<'_>, order: StringOrder) -> Ordering {
    let rank = left.rank();
    let rank_cmp = rank.cmp(&right.rank());
    if rank_cmp != Ordering::Equal {
        return rank_cmp;
    }

    match rank {
        TypeRank::Null => Ordering::Equal,
        TypeRank::Bool => left.slice().get_bool().cmp(&right.slice().get_bool()),
        TypeRank::Number => cmp_numbers(left.number(), right.number()),
        TypeRank::String => cmp_strings(
            left.slice().get_str().unwrap_or_default(),
            right.slice().get_str().unwrap_or_default(),
            order,
        ),
        TypeRank::Binary => left.slice().get_binary().cmp(&right.slice().get_binary()),
        TypeRank::Array => cmp_arrays(left, right, order),
        TypeRank::Object => cmp_objects(left.slice(), right.slice(), order),
    }
}

fn cmp_numbers(left: Option<Number>, right: Option<Number>) -> Ordering {
    match (left, right) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => a.cmp(&b),
        (Some(Number::Int(a)), Some(Number::Double(b))) => cmp_int_double(a, b),
        (Some(Number::Double(a)), Some(Number::Int(b))) => cmp_int_double(b, a).reverse(),
        (Some(Number::Double(a)), Some(Number::Double(b))) => {
            a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
        }
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

// 2^127, exactly representable as a double.
const TWO_POW_127: f64 = 1.701_411_834_604_692_3e38;

// Exact: the integer is never rounded. NaN sits where `total_cmp` puts it.
#[expect(clippy::cast_possible_truncation)]
fn cmp_int_double(int: i128, double: f64) -> Ordering {
    if double.is_nan() {
        return if double.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    let whole = double.trunc();
    if whole >= TWO_POW_127 {
        return Ordering::Less;
    }
    if whole < -TWO_POW_127 {
        return Ordering::Greater;
    }

    // |whole| < 2^127 or whole == -2^127, both exact as i128
    int.cmp(&(whole as i128)).then_with(|| {
        let fraction = double - whole;
        if fraction > 0.0 {
            Ordering::Less
        } else if fraction < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

fn cmp_strings(left: &str, right: &str, order: StringOrder) -> Ordering {
    match order {
        StringOrder::Binary => left.as_bytes().cmp(right.as_bytes()),
        StringOrder::Collated => fold_ci(left)
            .cmp(&fold_ci(right))
            .then_with(|| left.as_bytes().cmp(right.as_bytes())),
    }
}

fn fold_ci(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Cow::Owned(s.to_ascii_lowercase());
        }
        return Cow::Borrowed(s);
    }

    Cow::Owned(s.to_lowercase())
}

fn cmp_arrays(left: Operand<'_>, right: Operand<'_>, order: StringOrder) -> Ordering {
    for (l, r) in left.elements().zip(right.elements()) {
        let cmp = cmp_operands(l, r, order);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn cmp_objects(left: Slice<'_>, right: Slice<'_>, order: StringOrder) -> Ordering {
    let keys: BTreeSet<&str> = left
        .object_iter()
        .chain(right.object_iter())
        .map(|(key, _)| key)
        .collect();

    for key in keys {
        let l = left.get(key).unwrap_or_else(|| Slice::none());
        let r = right.get(key).unwrap_or_else(|| Slice::none());

        let cmp = cmp_operands(Operand::Slice(l), Operand::Slice(r), order);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    Ordering::Equal
}
