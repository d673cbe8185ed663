use super::{Repr, Value};
use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::Xxh3;

/// Stable XXH3 seed for value hashing.
pub(crate) const VALUE_HASH_SEED: u64 = 0x7661_6c75;

fn feed_u8(h: &mut Xxh3, x: u8) {
    h.update(&[x]);
}
fn feed_u64(h: &mut Xxh3, x: u64) {
    h.update(&x.to_be_bytes());
}
fn feed_i64(h: &mut Xxh3, x: i64) {
    h.update(&x.to_be_bytes());
}
fn feed_usize(h: &mut Xxh3, x: usize) {
    h.update(&x.to_be_bytes());
}

impl Value<'_> {
    /// 64-bit hash seeded by the storage tag.
    ///
    /// Owned encodings hash by content, borrowed values by the address they
    /// point at, ranges by their bounds. Consistent with `==`.
    #[must_use]
    pub fn fast_hash(&self) -> u64 {
        let mut h = Xxh3::with_seed(VALUE_HASH_SEED);
        feed_u8(&mut h, self.storage().to_u8());

        match &self.repr {
            Repr::Internal(_) | Repr::External(_) => feed_u64(&mut h, self.slice().hash64()),
            Repr::Reference { ptr, .. } | Repr::ReferenceSticky { ptr, .. } => {
                feed_usize(&mut h, ptr.as_ptr().addr());
            }
            Repr::Range(range) => {
                feed_i64(&mut h, range.low());
                feed_i64(&mut h, range.high());
            }
        }

        h.digest()
    }
}

impl Hash for Value<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fast_hash());
    }
}

///
/// Equality
///
/// Same storage kind required. Owned encodings are equal by bytes, borrowed
/// values by address, ranges by bounds. Use [`Value::compare`] for
/// value-level equality across storage kinds.
///

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Internal(_), Repr::Internal(_)) | (Repr::External(_), Repr::External(_)) => {
                self.slice().content_eq(&other.slice())
            }
            (Repr::Reference { ptr: a, .. }, Repr::Reference { ptr: b, .. })
            | (Repr::ReferenceSticky { ptr: a, .. }, Repr::ReferenceSticky { ptr: b, .. }) => {
                a == b
            }
            (Repr::Range(a), Repr::Range(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value<'_> {}
