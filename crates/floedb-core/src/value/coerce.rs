use super::Value;
use floedb_pack::{Number, Slice, SliceType};

///
/// Coercion
///
/// Total conversions used by arithmetic and boolean contexts. They never
/// fail: anything without a numeric reading becomes 0.
///

impl Value<'_> {
    /// Numeric reading of the value.
    ///
    /// `null`/`none` and non-numeric strings read as 0, booleans as 0/1,
    /// and single-element arrays (or ranges) as their element.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self.try_range() {
            #[allow(clippy::cast_precision_loss)]
            Some(range) if range.size() == 1 => range.low() as f64,
            Some(_) => 0.0,
            None => slice_to_f64(self.slice()),
        }
    }

    /// Integer reading of the value; doubles truncate toward zero and
    /// saturate at the `i64` bounds.
    #[must_use]
    pub fn to_i64(&self) -> i64 {
        match self.try_range() {
            Some(range) if range.size() == 1 => range.low(),
            Some(_) => 0,
            None => slice_to_i64(self.slice()),
        }
    }

    /// Truthiness: `none`, `null`, `false`, `0`, `""`, `[]` and `{}` are
    /// false. Every range is true.
    #[must_use]
    pub fn is_true(&self) -> bool {
        if self.is_range() {
            return true;
        }

        slice_is_true(self.slice())
    }

    #[must_use]
    pub fn is_false(&self) -> bool {
        !self.is_true()
    }
}

fn slice_to_f64(slice: Slice<'_>) -> f64 {
    match slice.slice_type() {
        SliceType::Int | SliceType::Double => slice.get_f64().unwrap_or(0.0),
        SliceType::Bool => bool_number(slice),
        SliceType::String => slice.get_str().and_then(parse_f64).unwrap_or(0.0),
        SliceType::Array if slice.length() == 1 => slice.at(0).map_or(0.0, slice_to_f64),
        _ => 0.0,
    }
}

fn slice_to_i64(slice: Slice<'_>) -> i64 {
    match slice.slice_type() {
        SliceType::Int | SliceType::Double => slice.number().map_or(0, number_to_i64),
        SliceType::Bool => i64::from(slice.get_bool().unwrap_or(false)),
        SliceType::String => slice.get_str().map_or(0, parse_i64),
        SliceType::Array if slice.length() == 1 => slice.at(0).map_or(0, slice_to_i64),
        _ => 0,
    }
}

fn slice_is_true(slice: Slice<'_>) -> bool {
    match slice.slice_type() {
        SliceType::None | SliceType::Null => false,
        SliceType::Bool => slice.get_bool().unwrap_or(false),
        SliceType::Int | SliceType::Double => match slice.number() {
            Some(Number::Int(i)) => i != 0,
            Some(Number::Double(d)) => d != 0.0,
            None => false,
        },
        SliceType::String => slice.get_str().is_some_and(|s| !s.is_empty()),
        SliceType::Binary => slice.get_binary().is_some_and(|b| !b.is_empty()),
        SliceType::Array | SliceType::Object => slice.length() > 0,
    }
}

fn bool_number(slice: Slice<'_>) -> f64 {
    if slice.get_bool().unwrap_or(false) {
        1.0
    } else {
        0.0
    }
}

// Leading and trailing whitespace is ignored; infinities and NaN are not
// numeric readings.
fn parse_f64(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_i64(text: &str) -> i64 {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return i;
    }

    parse_f64(trimmed).map_or(0, f64_to_i64)
}

fn number_to_i64(number: Number) -> i64 {
    match number {
        Number::Int(i) => i64::try_from(i).unwrap_or(if i < 0 { i64::MIN } else { i64::MAX }),
        Number::Double(d) => f64_to_i64(d),
    }
}

// `as` saturates and maps NaN to 0.
#[allow(clippy::cast_possible_truncation)]
fn f64_to_i64(value: f64) -> i64 {
    value as i64
}
