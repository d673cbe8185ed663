use thiserror::Error as ThisError;

///
/// PackError
///
/// Failures raised while validating, building or (de)serializing encoded
/// values. Navigation on an already-validated slice never returns these.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PackError {
    #[error("encoded input is empty")]
    Empty,

    #[error("encoded input truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("unsupported header byte 0x{byte:02x} at offset {offset}")]
    UnsupportedHeader { byte: u8, offset: usize },

    #[error("object key at offset {offset} is not a string")]
    NonStringKey { offset: usize },

    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("nesting exceeds maximum depth of {max}")]
    NestingTooDeep { max: usize },

    #[error("{count} trailing bytes after encoded value")]
    TrailingBytes { count: usize },

    #[error("close() without an open array or object")]
    UnbalancedClose,

    #[error("{open} array/object scopes still open")]
    UnclosedCompound { open: usize },

    #[error("object closed with a dangling key")]
    DanglingKey,

    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    SizeLimitExceeded { len: usize, max_bytes: usize },
}
