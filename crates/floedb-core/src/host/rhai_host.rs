use super::HostRuntime;
use rhai::{Dynamic, Map};

///
/// RhaiHost
///
/// Builds `rhai` script values. Rhai maps are key-sorted, so member order
/// is not preserved.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct RhaiHost;

impl HostRuntime for RhaiHost {
    type Value = Dynamic;

    fn null(&self) -> Dynamic {
        Dynamic::UNIT
    }

    fn boolean(&self, value: bool) -> Dynamic {
        Dynamic::from_bool(value)
    }

    fn number(&self, value: f64) -> Dynamic {
        Dynamic::from_float(value)
    }

    fn integer(&self, value: i64) -> Dynamic {
        Dynamic::from_int(value)
    }

    fn string(&self, value: &str) -> Dynamic {
        Dynamic::from(value.to_owned())
    }

    fn array(&self, items: Vec<Dynamic>) -> Dynamic {
        Dynamic::from_array(items)
    }

    fn object(&self, members: Vec<(String, Dynamic)>) -> Dynamic {
        let map: Map = members
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        Dynamic::from_map(map)
    }
}
