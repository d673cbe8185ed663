use super::{Repr, Value};
use floedb_pack::{Builder, PackError, SliceType};

impl<'a> Value<'a> {
    ///
    /// TYPES
    ///

    /// True only for the empty value; `null` is a value.
    #[must_use]
    pub fn is_none(&self) -> bool {
        !self.is_range() && self.slice().is_none()
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.slice().is_null()
    }

    /// `none` or `null`.
    #[must_use]
    pub fn is_null_or_none(&self) -> bool {
        self.is_none() || self.is_null()
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.slice().is_bool()
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        self.slice().is_number()
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        self.slice().is_string()
    }

    /// Arrays and ranges.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_range() || self.slice().is_array()
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.slice().is_object()
    }

    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self.repr, Repr::Range(_))
    }

    /// Query-level type name; ranges report as arrays.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        if self.is_range() {
            return "array";
        }

        match self.slice().slice_type() {
            SliceType::None => "none",
            SliceType::Null => "null",
            SliceType::Bool => "bool",
            SliceType::Int | SliceType::Double => "number",
            SliceType::String => "string",
            SliceType::Binary => "binary",
            SliceType::Array => "array",
            SliceType::Object => "object",
        }
    }

    ///
    /// NAVIGATION
    ///

    /// Array length, range cardinality or object member count; 0 otherwise.
    #[must_use]
    pub fn length(&self) -> usize {
        match self.try_range() {
            Some(range) => range.size(),
            None => self.slice().length(),
        }
    }

    /// Element at `position`; negative positions count from the end.
    /// Out of bounds, and non-arrays, yield `none`.
    #[must_use]
    pub fn at(&self, position: i64) -> Value<'_> {
        let len = self.length();
        let index = if position < 0 {
            usize::try_from(position.unsigned_abs())
                .ok()
                .and_then(|back| len.checked_sub(back))
        } else {
            usize::try_from(position).ok()
        };
        let Some(index) = index else {
            return Value::none();
        };

        match self.try_range() {
            Some(range) => range.at(index).map_or_else(Value::none, Value::from_i64),
            None => self
                .slice()
                .at(index)
                .map_or_else(Value::none, Value::reference),
        }
    }

    /// Object member `key`, borrowed from this value. Missing members and
    /// non-objects yield `none`.
    #[must_use]
    pub fn get(&self, key: &str) -> Value<'_> {
        self.slice()
            .get(key)
            .map_or_else(Value::none, Value::reference)
    }

    /// Nested member lookup; an empty path yields a reference to the whole
    /// value (ranges have none).
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Value<'_> {
        self.slice()
            .get_path(path)
            .map_or_else(Value::none, Value::reference)
    }

    /// Whether an object has member `key`.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.slice().get(key).is_some()
    }

    ///
    /// OUTPUT
    ///

    /// Append this value to `builder`. Ranges are written as arrays.
    pub fn write_to(&self, builder: &mut Builder) {
        match self.try_range() {
            Some(range) => {
                builder.open_array();
                for i in range {
                    builder.add_i64(i);
                }
                builder.close();
            }
            None => {
                builder.add_slice(self.slice());
            }
        }
    }

    /// Like [`Value::write_to`], writing `null` for `none`.
    pub(crate) fn write_or_null(&self, builder: &mut Builder) {
        if self.is_none() {
            builder.add_null();
        } else {
            self.write_to(builder);
        }
    }

    /// Owned copy with ranges expanded into arrays.
    pub fn materialize(&self) -> Result<Value<'static>, PackError> {
        if !self.is_range() {
            return Ok(self.to_owned_value());
        }

        let mut builder = Builder::with_capacity(self.length().saturating_add(2));
        self.write_to(&mut builder);

        Value::from_buffer(builder.finish()?)
    }

    /// Decode into any serde type. Ranges decode as integer arrays.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, PackError> {
        if self.is_range() {
            return self.materialize()?.slice().deserialize();
        }

        self.slice().deserialize()
    }
}
