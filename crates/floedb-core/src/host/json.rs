use super::HostRuntime;
use serde_json::{Map, Number, Value as JsonValue};

///
/// JsonHost
///
/// Builds `serde_json` values. Object member order is preserved; non-finite
/// doubles become `null`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonHost;

impl HostRuntime for JsonHost {
    type Value = JsonValue;

    fn null(&self) -> JsonValue {
        JsonValue::Null
    }

    fn boolean(&self, value: bool) -> JsonValue {
        JsonValue::Bool(value)
    }

    fn number(&self, value: f64) -> JsonValue {
        Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
    }

    fn integer(&self, value: i64) -> JsonValue {
        JsonValue::Number(value.into())
    }

    fn string(&self, value: &str) -> JsonValue {
        JsonValue::String(value.to_owned())
    }

    fn array(&self, items: Vec<JsonValue>) -> JsonValue {
        JsonValue::Array(items)
    }

    fn object(&self, members: Vec<(String, JsonValue)>) -> JsonValue {
        JsonValue::Object(members.into_iter().collect::<Map<_, _>>())
    }
}
