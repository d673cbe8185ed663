use crate::{
    PackError, Slice, cbor,
    header::{
        MAJOR_ARRAY, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TEXT, MAJOR_UNSIGNED,
        NONE_BYTE, NULL_BYTE, SIMPLE_F64, SIMPLE_FALSE, SIMPLE_TRUE, to_definite, write_header,
    },
};
use serde::Serialize;

///
/// Frame
///
/// One open array/object scope. Headers are written on `close`, once the
/// member count is known.
///

#[derive(Clone, Copy, Debug)]
struct Frame {
    start: usize,
    object: bool,
    items: u64,
}

///
/// Builder
///
/// Incremental writer for encoded values. Scalar appends are infallible;
/// structural mistakes are remembered and reported by [`Builder::slice`] /
/// [`Builder::finish`].
///

#[derive(Clone, Debug, Default)]
pub struct Builder {
    buf: Vec<u8>,
    stack: Vec<Frame>,
    error: Option<PackError>,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Encode any serde value as a single item.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, PackError> {
        let mut builder = Self::new();
        builder.add_serialize(value)?;

        Ok(builder)
    }

    /// Drop all written bytes and open scopes.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.stack.clear();
        self.error = None;
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.stack.is_empty()
    }

    ///
    /// SCALARS
    ///

    pub fn add_none(&mut self) -> &mut Self {
        self.note_item(false);
        self.buf.push(NONE_BYTE);
        self
    }

    pub fn add_null(&mut self) -> &mut Self {
        self.note_item(false);
        self.buf.push(NULL_BYTE);
        self
    }

    pub fn add_bool(&mut self, value: bool) -> &mut Self {
        self.note_item(false);
        let info = if value { SIMPLE_TRUE } else { SIMPLE_FALSE };
        self.buf.push((MAJOR_SIMPLE << 5) | info);
        self
    }

    #[expect(clippy::cast_sign_loss)]
    pub fn add_i64(&mut self, value: i64) -> &mut Self {
        self.note_item(false);
        if value >= 0 {
            write_header(&mut self.buf, MAJOR_UNSIGNED, value as u64);
        } else {
            // -1 - value cannot overflow for negative input
            write_header(&mut self.buf, MAJOR_NEGATIVE, (-1 - value) as u64);
        }
        self
    }

    pub fn add_u64(&mut self, value: u64) -> &mut Self {
        self.note_item(false);
        write_header(&mut self.buf, MAJOR_UNSIGNED, value);
        self
    }

    /// Doubles are always written at full precision.
    pub fn add_f64(&mut self, value: f64) -> &mut Self {
        self.note_item(false);
        self.buf.push((MAJOR_SIMPLE << 5) | SIMPLE_F64);
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
        self
    }

    pub fn add_str(&mut self, value: &str) -> &mut Self {
        self.note_item(true);
        write_header(&mut self.buf, MAJOR_TEXT, value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Object member name; must be followed by exactly one value.
    pub fn add_key(&mut self, key: &str) -> &mut Self {
        self.add_str(key)
    }

    /// Copy an already-encoded item verbatim.
    pub fn add_slice(&mut self, slice: Slice<'_>) -> &mut Self {
        self.note_item(slice.is_string());
        self.buf.extend_from_slice(slice.as_bytes());
        self
    }

    /// Encode a serde value in place. Unsized sequences and maps are
    /// rewritten with definite lengths.
    pub fn add_serialize<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, PackError> {
        let bytes = to_definite(&cbor::serialize(value)?)?;
        let slice = Slice::new_exact(&bytes)?;
        self.add_slice(slice);

        Ok(self)
    }

    ///
    /// COMPOUNDS
    ///

    pub fn open_array(&mut self) -> &mut Self {
        self.open(false)
    }

    pub fn open_object(&mut self) -> &mut Self {
        self.open(true)
    }

    fn open(&mut self, object: bool) -> &mut Self {
        self.note_item(false);
        self.stack.push(Frame {
            start: self.buf.len(),
            object,
            items: 0,
        });
        self
    }

    /// Close the innermost open array/object and write its header.
    pub fn close(&mut self) -> &mut Self {
        let Some(frame) = self.stack.pop() else {
            self.fail(PackError::UnbalancedClose);
            return self;
        };

        let (major, count) = if frame.object {
            if frame.items % 2 != 0 {
                self.fail(PackError::DanglingKey);
            }
            (MAJOR_MAP, frame.items / 2)
        } else {
            (MAJOR_ARRAY, frame.items)
        };

        let mut header = Vec::with_capacity(9);
        write_header(&mut header, major, count);
        self.buf.splice(frame.start..frame.start, header);
        self
    }

    ///
    /// OUTPUT
    ///

    /// View the first complete item written so far.
    pub fn slice(&self) -> Result<Slice<'_>, PackError> {
        self.check()?;
        Slice::new(&self.buf)
    }

    /// Take the encoded bytes.
    pub fn finish(self) -> Result<Vec<u8>, PackError> {
        self.check()?;
        if self.buf.is_empty() {
            return Err(PackError::Empty);
        }

        Ok(self.buf)
    }

    fn check(&self) -> Result<(), PackError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if !self.stack.is_empty() {
            return Err(PackError::UnclosedCompound {
                open: self.stack.len(),
            });
        }

        Ok(())
    }

    // Track member counts and reject non-string object keys.
    fn note_item(&mut self, is_text: bool) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };

        let key_position = frame.object && frame.items % 2 == 0;
        frame.items += 1;
        if key_position && !is_text {
            let offset = self.buf.len();
            self.fail(PackError::NonStringKey { offset });
        }
    }

    fn fail(&mut self, err: PackError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
