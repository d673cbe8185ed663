//! Value layer for the FloeDB query engine: the fixed-size
//! [`Value`](value::Value) currency, lazy integer [`Range`](range::Range)s,
//! canonical ordering and hashing, host runtime conversion, row-block
//! assembly and the legacy interop shim.
#![warn(unreachable_pub)]

pub mod block;
pub mod error;
pub mod host;
pub mod legacy;
pub mod range;
pub mod value;

// re-exports
pub use floedb_pack as pack;

///
/// CONSTANTS
///

/// Largest encoded value stored inline inside a [`Value`](value::Value).
///
/// Anything longer spills into an owned external buffer.
pub const INLINE_CAPACITY: usize = 15;

/// Largest encoded item a borrowed value may point at.
///
/// Borrowed variants keep a 32-bit length next to the pointer so the value
/// stays at 16 bytes.
pub const MAX_REFERENCE_BYTES: usize = u32::MAX as usize;

///
/// Prelude
///
/// Domain vocabulary only; no errors or helpers.
///

pub mod prelude {
    pub use crate::{
        block::{RegisterId, RowBlock},
        host::HostRuntime,
        range::Range,
        value::{BorrowKind, StorageTag, StringOrder, Value},
    };
    pub use floedb_pack::{Builder, Slice, SliceType};
}
