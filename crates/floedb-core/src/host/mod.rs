//! Conversion of values into an embedded runtime's native object model.

mod json;
#[cfg(feature = "rhai")]
mod rhai_host;


use crate::value::Value;
use floedb_pack::{Slice, SliceType};
use std::{collections::HashSet, hash::BuildHasher};

// re-exports
pub use json::JsonHost;
#[cfg(feature = "rhai")]
pub use rhai_host::RhaiHost;

///
/// HostRuntime
///
/// Constructors of a host runtime's native values. Implementations only
/// build values; the tree walk lives in [`Value::to_host`].
///

pub trait HostRuntime {
    type Value;

    fn null(&self) -> Self::Value;

    fn boolean(&self, value: bool) -> Self::Value;

    fn number(&self, value: f64) -> Self::Value;

    /// Integers that fit an `i64`. Hosts without an integer type keep the
    /// default, which goes through [`HostRuntime::number`].
    #[allow(clippy::cast_precision_loss)]
    fn integer(&self, value: i64) -> Self::Value {
        self.number(value as f64)
    }

    fn string(&self, value: &str) -> Self::Value;

    fn array(&self, items: Vec<Self::Value>) -> Self::Value;

    /// Members arrive in encoded order.
    fn object(&self, members: Vec<(String, Self::Value)>) -> Self::Value;
}

impl Value<'_> {
    /// Deep conversion into host values. `none` becomes the host's null and
    /// ranges become arrays of integers.
    pub fn to_host<H: HostRuntime>(&self, host: &H) -> H::Value {
        match self.try_range() {
            Some(range) => host.array(range.iter().map(|i| host.integer(i)).collect()),
            None => slice_to_host(self.slice(), host),
        }
    }

    /// Like [`Value::to_host`], but an object keeps only the members named
    /// in `wanted`. Non-objects convert in full.
    pub fn to_host_partial<H, S>(&self, host: &H, wanted: &HashSet<String, S>) -> H::Value
    where
        H: HostRuntime,
        S: BuildHasher,
    {
        let slice = self.slice();
        if !slice.is_object() {
            return self.to_host(host);
        }

        let members = slice
            .object_iter()
            .filter(|(key, _)| wanted.contains(*key))
            .map(|(key, value)| (key.to_owned(), slice_to_host(value, host)))
            .collect();

        host.object(members)
    }
}

fn slice_to_host<H: HostRuntime>(slice: Slice<'_>, host: &H) -> H::Value {
    match slice.slice_type() {
        SliceType::None | SliceType::Null => host.null(),
        SliceType::Bool => host.boolean(slice.get_bool().unwrap_or(false)),
        SliceType::Int => match slice.get_i64() {
            Some(i) => host.integer(i),
            None => host.number(slice.get_f64().unwrap_or(0.0)),
        },
        SliceType::Double => host.number(slice.get_f64().unwrap_or(0.0)),
        SliceType::String => host.string(slice.get_str().unwrap_or_default()),
        // binary has no portable host form
        SliceType::Binary => host.null(),
        SliceType::Array => host.array(
            slice
                .array_iter()
                .map(|item| slice_to_host(item, host))
                .collect(),
        ),
        SliceType::Object => host.object(
            slice
                .object_iter()
                .map(|(key, value)| (key.to_owned(), slice_to_host(value, host)))
                .collect(),
        ),
    }
}
