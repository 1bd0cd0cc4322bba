use alloc::{string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen};
use serde_json::{Map, Number};

use crate::{JsonArray, JsonObject, Value};

/// A JSON document generated for property tests, held as a `serde_json`
/// value so that `serde_json` can act as the reference reader and writer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document(pub(crate) serde_json::Value);

fn number(g: &mut Gen) -> serde_json::Value {
    if bool::arbitrary(g) {
        serde_json::Value::from(i64::arbitrary(g))
    } else {
        let mut value = f64::arbitrary(g);
        while !value.is_finite() {
            value = f64::arbitrary(g);
        }
        Number::from_f64(value).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn scalar(g: &mut Gen) -> serde_json::Value {
    match usize::arbitrary(g) % 4 {
        0 => serde_json::Value::Null,
        1 => serde_json::Value::Bool(bool::arbitrary(g)),
        2 => number(g),
        _ => serde_json::Value::String(String::arbitrary(g)),
    }
}

fn generate(g: &mut Gen, depth: usize) -> serde_json::Value {
    if depth == 0 {
        return scalar(g);
    }
    match usize::arbitrary(g) % 6 {
        0..=3 => scalar(g),
        4 => {
            let len = usize::arbitrary(g) % 4;
            (0..len).map(|_| generate(g, depth - 1)).collect()
        }
        _ => {
            let len = usize::arbitrary(g) % 4;
            let mut map = Map::new();
            for _ in 0..len {
                map.insert(String::arbitrary(g), generate(g, depth - 1));
            }
            serde_json::Value::Object(map)
        }
    }
}

impl Arbitrary for Document {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 4;
        Self(generate(g, depth))
    }
}

/// A document whose root is an array.
#[derive(Debug, Clone)]
pub(crate) struct ArrayDocument(pub(crate) Vec<serde_json::Value>);

impl Arbitrary for ArrayDocument {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 8;
        Self((0..len).map(|_| Document::arbitrary(g).0).collect())
    }
}

/// A document whose root is an object.
#[derive(Debug, Clone)]
pub(crate) struct ObjectDocument(pub(crate) Map<String, serde_json::Value>);

impl Arbitrary for ObjectDocument {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 8;
        let mut map = Map::new();
        for _ in 0..len {
            map.insert(String::arbitrary(g), Document::arbitrary(g).0);
        }
        Self(map)
    }
}

/// Renders a document either compactly or with indentation, so scanned
/// offsets see both layouts.
pub(crate) fn render(value: &serde_json::Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap()
    } else {
        serde_json::to_string(value).unwrap()
    }
}

/// Converts a materialized value for comparison with the reference.
pub(crate) fn to_serde(value: &Value) -> serde_json::Value {
    match value {
        Value::Object(object) => serde_json::Value::Object(
            object
                .iter()
                .map(|(key, value)| (key, to_serde(&value)))
                .collect(),
        ),
        Value::Array(array) => array.iter().map(|value| to_serde(&value)).collect(),
        Value::String(text) => serde_json::Value::String(text.clone()),
        Value::Integer(integer) => serde_json::Value::from(*integer),
        Value::Double(double) => {
            Number::from_f64(*double).map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
        Value::Bool(boolean) => serde_json::Value::Bool(*boolean),
        Value::Null => serde_json::Value::Null,
    }
}

/// Builds a value to write, growing containers through `push` and `set`.
pub(crate) fn from_serde(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(boolean) => Value::Bool(*boolean),
        serde_json::Value::Number(number) => number
            .as_i64()
            .map(Value::Integer)
            .or_else(|| number.as_f64().map(Value::Double))
            .unwrap_or(Value::Null),
        serde_json::Value::String(text) => Value::String(text.clone()),
        serde_json::Value::Array(items) => {
            let mut array = JsonArray::new();
            for item in items {
                array.push(from_serde(item));
            }
            Value::Array(array)
        }
        serde_json::Value::Object(members) => {
            let mut object = JsonObject::new();
            for (key, member) in members {
                object.set(key, from_serde(member));
            }
            Value::Object(object)
        }
    }
}
