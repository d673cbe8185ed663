//! Self-describing binary encoding for FloeDB values.
//!
//! The wire form is a strict subset of CBOR (RFC 8949): definite lengths
//! only, text-string object keys, no tags. [`Slice`] is a borrowed,
//! navigable view over one encoded item and [`Builder`] writes items
//! incrementally. Object members keep the order they were written in.
#![warn(unreachable_pub)]

mod builder;
mod cbor;
mod error;
mod header;
mod slice;


pub use builder::Builder;
pub use cbor::{deserialize, deserialize_bounded, serialize};
pub use error::PackError;
pub use slice::{ArrayIter, Number, ObjectIter, Slice, SliceType};

///
/// CONSTANTS
///

/// Maximum nesting depth accepted when validating encoded input.
///
/// Deeper input is rejected rather than walked recursively.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Default upper bound for payloads handed to [`deserialize`].
pub const DEFAULT_DECODE_LIMIT: usize = 64 * 1024 * 1024;

/// Stable XXH3 seed for slice content hashes.
pub const SLICE_HASH_SEED: u64 = 0x464c_4f45;
