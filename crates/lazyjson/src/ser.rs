use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{JsonArray, JsonObject, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Object(object) => object.serialize(serializer),
            Self::Array(array) => array.serialize(serializer),
            Self::String(text) => serializer.serialize_str(text),
            Self::Integer(integer) => serializer.serialize_i64(*integer),
            Self::Double(double) if double.is_finite() => serializer.serialize_f64(*double),
            Self::Bool(boolean) => serializer.serialize_bool(*boolean),
            Self::Double(_) | Self::Null => serializer.serialize_unit(),
        }
    }
}

impl Serialize for JsonArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(&value)?;
        }
        seq.end()
    }
}

/// Duplicate keys are emitted as they appear in the document.
impl Serialize for JsonObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(&key, &value)?;
        }
        map.end()
    }
}
