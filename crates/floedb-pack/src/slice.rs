use crate::{
    PackError, SLICE_HASH_SEED, cbor,
    header::{
        Header, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TEXT,
        MAJOR_UNSIGNED, NONE_BYTE, NULL_BYTE, SIMPLE_F16, SIMPLE_F32, SIMPLE_F64, SIMPLE_FALSE,
        SIMPLE_NULL, SIMPLE_TRUE, f16_to_f64, item_len, read_header,
    },
};
use serde::de::DeserializeOwned;
use std::fmt;
use xxhash_rust::xxh3::xxh3_64_with_seed;

static NONE_SLICE: [u8; 1] = [NONE_BYTE];
static NULL_SLICE: [u8; 1] = [NULL_BYTE];

///
/// SliceType
///
/// Logical type of one encoded item.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SliceType {
    None,
    Null,
    Bool,
    Int,
    Double,
    String,
    Binary,
    Array,
    Object,
}

impl SliceType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

///
/// Number
///
/// Numeric payload of an `Int` or `Double` item. Integers cover the full
/// encodable range (`-2^64 ..= 2^64 - 1`).
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i128),
    Double(f64),
}

impl Number {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Double(d) => d,
        }
    }
}

///
/// Slice
///
/// Borrowed view over exactly one encoded item. Copying a slice copies the
/// view, never the bytes.
///

#[derive(Clone, Copy)]
pub struct Slice<'a> {
    bytes: &'a [u8],
}

impl<'a> Slice<'a> {
    /// Validate the item at the start of `bytes` and view exactly its bytes.
    /// Trailing input after the item is ignored.
    pub fn new(bytes: &'a [u8]) -> Result<Self, PackError> {
        if bytes.is_empty() {
            return Err(PackError::Empty);
        }
        let len = item_len(bytes, 0)?;

        Ok(Self {
            bytes: &bytes[..len],
        })
    }

    /// Like [`Slice::new`] but rejects trailing bytes.
    pub fn new_exact(bytes: &'a [u8]) -> Result<Self, PackError> {
        let slice = Self::new(bytes)?;
        let trailing = bytes.len() - slice.byte_size();
        if trailing > 0 {
            return Err(PackError::TrailingBytes { count: trailing });
        }

        Ok(slice)
    }

    /// View bytes that were validated earlier and hold exactly one item.
    ///
    /// No validation happens here. Accessors stay bounds-checked, so bytes
    /// that break the precondition read as `none`/empty rather than panic.
    #[must_use]
    pub const fn from_trusted(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The shared `none` slice (absent value).
    #[must_use]
    pub fn none() -> Slice<'static> {
        Slice { bytes: &NONE_SLICE }
    }

    /// The shared `null` slice.
    #[must_use]
    pub fn null() -> Slice<'static> {
        Slice { bytes: &NULL_SLICE }
    }

    ///
    /// RAW ACCESS
    ///

    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[must_use]
    pub const fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    /// XXH3 content hash of the encoded bytes.
    #[must_use]
    pub fn hash64(&self) -> u64 {
        xxh3_64_with_seed(self.bytes, SLICE_HASH_SEED)
    }

    /// Byte-wise equality of two encoded items.
    #[must_use]
    pub fn content_eq(&self, other: &Slice<'_>) -> bool {
        self.bytes == other.bytes
    }

    /// Decode into any serde type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, PackError> {
        cbor::deserialize(self.bytes)
    }

    ///
    /// TYPES
    ///

    fn header(&self) -> Option<Header> {
        read_header(self.bytes, 0).ok()
    }

    #[must_use]
    pub fn slice_type(&self) -> SliceType {
        let Some(header) = self.header() else {
            return SliceType::None;
        };

        match header.major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => SliceType::Int,
            MAJOR_BYTES => SliceType::Binary,
            MAJOR_TEXT => SliceType::String,
            MAJOR_ARRAY => SliceType::Array,
            MAJOR_MAP => SliceType::Object,
            MAJOR_SIMPLE => match header.info {
                SIMPLE_FALSE | SIMPLE_TRUE => SliceType::Bool,
                SIMPLE_NULL => SliceType::Null,
                SIMPLE_F16 | SIMPLE_F32 | SIMPLE_F64 => SliceType::Double,
                _ => SliceType::None,
            },
            _ => SliceType::None,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.slice_type() == SliceType::None
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.slice_type() == SliceType::Null
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.slice_type() == SliceType::Bool
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.slice_type(), SliceType::Int | SliceType::Double)
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        self.slice_type() == SliceType::String
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.slice_type() == SliceType::Array
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.slice_type() == SliceType::Object
    }

    ///
    /// SCALARS
    ///

    #[must_use]
    pub fn get_bool(&self) -> Option<bool> {
        let header = self.header()?;
        match (header.major, header.info) {
            (MAJOR_SIMPLE, SIMPLE_TRUE) => Some(true),
            (MAJOR_SIMPLE, SIMPLE_FALSE) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn number(&self) -> Option<Number> {
        let header = self.header()?;
        match header.major {
            MAJOR_UNSIGNED => Some(Number::Int(i128::from(header.arg))),
            MAJOR_NEGATIVE => Some(Number::Int(-1 - i128::from(header.arg))),
            MAJOR_SIMPLE => match header.info {
                #[allow(clippy::cast_possible_truncation)]
                SIMPLE_F16 => Some(Number::Double(f16_to_f64(header.arg as u16))),
                #[allow(clippy::cast_possible_truncation)]
                SIMPLE_F32 => Some(Number::Double(f64::from(f32::from_bits(header.arg as u32)))),
                SIMPLE_F64 => Some(Number::Double(f64::from_bits(header.arg))),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integer payload if it fits an `i64`.
    #[must_use]
    pub fn get_i64(&self) -> Option<i64> {
        match self.number()? {
            Number::Int(i) => i64::try_from(i).ok(),
            Number::Double(_) => None,
        }
    }

    /// Integer payload if it fits a `u64`.
    #[must_use]
    pub fn get_u64(&self) -> Option<u64> {
        match self.number()? {
            Number::Int(i) => u64::try_from(i).ok(),
            Number::Double(_) => None,
        }
    }

    /// Any numeric payload widened to `f64`.
    #[must_use]
    pub fn get_f64(&self) -> Option<f64> {
        self.number().map(Number::as_f64)
    }

    #[must_use]
    pub fn get_str(&self) -> Option<&'a str> {
        let header = self.header()?;
        if header.major != MAJOR_TEXT {
            return None;
        }

        std::str::from_utf8(self.payload(header)?).ok()
    }

    #[must_use]
    pub fn get_binary(&self) -> Option<&'a [u8]> {
        let header = self.header()?;
        if header.major != MAJOR_BYTES {
            return None;
        }

        self.payload(header)
    }

    fn payload(&self, header: Header) -> Option<&'a [u8]> {
        let len = usize::try_from(header.arg).ok()?;
        self.bytes.get(header.size..header.size.checked_add(len)?)
    }

    ///
    /// COMPOUNDS
    ///

    /// Number of array elements or object members; 0 for scalars.
    #[must_use]
    pub fn length(&self) -> usize {
        match self.header() {
            Some(header) if matches!(header.major, MAJOR_ARRAY | MAJOR_MAP) => {
                usize::try_from(header.arg).unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Iterate array elements. Non-arrays yield nothing.
    #[must_use]
    pub fn array_iter(&self) -> ArrayIter<'a> {
        match self.header() {
            Some(header) if header.major == MAJOR_ARRAY => ArrayIter {
                bytes: self.bytes,
                offset: header.size,
                remaining: usize::try_from(header.arg).unwrap_or(0),
            },
            _ => ArrayIter::empty(),
        }
    }

    /// Iterate object members in encoded order. Non-objects yield nothing.
    #[must_use]
    pub fn object_iter(&self) -> ObjectIter<'a> {
        match self.header() {
            Some(header) if header.major == MAJOR_MAP => ObjectIter {
                inner: ArrayIter {
                    bytes: self.bytes,
                    offset: header.size,
                    remaining: usize::try_from(header.arg).unwrap_or(0).saturating_mul(2),
                },
            },
            _ => ObjectIter {
                inner: ArrayIter::empty(),
            },
        }
    }

    /// Array element at `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Self> {
        self.array_iter().nth(index)
    }

    /// Object member named `key` (first match in encoded order).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Self> {
        self.object_iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }

    /// Nested object member lookup; an empty path yields `self`.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<Self> {
        path.iter().try_fold(*self, |current, key| current.get(key))
    }
}

impl PartialEq for Slice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other)
    }
}

impl Eq for Slice<'_> {}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slice({self})")
    }
}

impl fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slice_type() {
            SliceType::None => f.write_str("none"),
            SliceType::Null => f.write_str("null"),
            SliceType::Bool => write!(f, "{}", self.get_bool().unwrap_or(false)),
            SliceType::Int | SliceType::Double => match self.number() {
                Some(Number::Int(i)) => write!(f, "{i}"),
                Some(Number::Double(d)) => write!(f, "{d}"),
                None => f.write_str("none"),
            },
            SliceType::String => write!(f, "{:?}", self.get_str().unwrap_or_default()),
            SliceType::Binary => {
                f.write_str("b\"")?;
                for byte in self.get_binary().unwrap_or_default() {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("\"")
            }
            SliceType::Array => {
                f.write_str("[")?;
                for (i, item) in self.array_iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            SliceType::Object => {
                f.write_str("{")?;
                for (i, (key, value)) in self.object_iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

///
/// ArrayIter
///

#[derive(Clone, Debug)]
pub struct ArrayIter<'a> {
    bytes: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl ArrayIter<'_> {
    const fn empty() -> Self {
        Self {
            bytes: &[],
            offset: 0,
            remaining: 0,
        }
    }
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Slice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // malformed trusted input ends the iteration
        let Ok(len) = item_len(self.bytes, self.offset) else {
            self.remaining = 0;
            return None;
        };
        let item = Slice::from_trusted(&self.bytes[self.offset..self.offset + len]);
        self.offset += len;
        self.remaining -= 1;

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

///
/// ObjectIter
///

#[derive(Clone, Debug)]
pub struct ObjectIter<'a> {
    inner: ArrayIter<'a>,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = (&'a str, Slice<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.inner.next()?.get_str()?;
        let value = self.inner.next()?;

        Some((key, value))
    }
}
