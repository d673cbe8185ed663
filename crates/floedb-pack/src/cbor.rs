use crate::{DEFAULT_DECODE_LIMIT, PackError};
use serde::{Serialize, de::DeserializeOwned};
use serde_cbor::{from_slice, to_vec};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Serialize a value into encoded bytes.
pub fn serialize<T>(t: &T) -> Result<Vec<u8>, PackError>
where
    T: Serialize,
{
    to_vec(t).map_err(|e| PackError::Serialize(e.to_string()))
}

/// Deserialize encoded bytes, bounded by [`DEFAULT_DECODE_LIMIT`].
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, PackError>
where
    T: DeserializeOwned,
{
    deserialize_bounded(bytes, DEFAULT_DECODE_LIMIT)
}

/// Deserialize encoded bytes with an explicit size limit.
///
/// Safety guarantees:
/// - Input size is bounded before decode.
/// - Any panic during decode is caught and reported as a deserialize error.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, PackError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(PackError::SizeLimitExceeded {
            len: bytes.len(),
            max_bytes,
        });
    }

    let result = catch_unwind(AssertUnwindSafe(|| from_slice(bytes)));

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(PackError::Deserialize(err.to_string())),
        Err(_) => Err(PackError::Deserialize(
            "panic during CBOR deserialization".into(),
        )),
    }
}
