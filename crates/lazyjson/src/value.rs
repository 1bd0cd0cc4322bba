//! Materialized JSON values.
//!
//! A [`Value`] is what a view hands out when an element is read, and what it
//! accepts when an element is written. Scalars are decoded eagerly; objects
//! and arrays stay lazy and are represented by their own views.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use bstr::ByteSlice;

use crate::{
    Bounds, Buffer, Description, JsonArray, JsonObject, JsonType,
    description::signed,
    escape::{escape_into, unescape},
};

/// A JSON value read from, or written to, a [`JsonArray`] or [`JsonObject`].
///
/// # Examples
///
/// ```
/// use lazyjson::{JsonObject, Value};
///
/// let object: JsonObject = r#"{"n": 1, "list": [true, null]}"#.parse().unwrap();
/// assert_eq!(object.get("n"), Some(Value::Integer(1)));
///
/// let list = object.get("list").unwrap();
/// let list = list.as_array().unwrap();
/// assert_eq!(list.get(0), Value::Bool(true));
/// assert!(list.get(1).is_null());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// A lazily indexed object.
    Object(JsonObject),
    /// A lazily indexed array.
    Array(JsonArray),
    /// A decoded string.
    String(String),
    /// A number written without fraction or exponent that fits an `i64`.
    Integer(i64),
    /// Any other number. Non-finite doubles are written as `null`.
    Double(f64),
    /// `true` or `false`.
    Bool(bool),
    /// The `null` literal.
    #[default]
    Null,
}

impl Value {
    /// Decodes the value described at record offset `at`.
    ///
    /// Containers are carved out into independent views: their records are
    /// copied and rebased onto a slice of `buffer` that starts at the
    /// container's opening bracket.
    pub(crate) fn materialize(buffer: &Buffer, description: &Description, at: usize) -> Self {
        let reader = description.reader();
        let ty = reader.record_type(at);
        let bounds = reader.data_bounds(at);
        let raw = &buffer.as_bytes()[bounds.range()];

        match ty {
            JsonType::Object | JsonType::Array => {
                let (json, records) = carve(buffer, description, at);
                if ty == JsonType::Object {
                    Self::Object(JsonObject::from_parts_unchecked(json, records))
                } else {
                    Self::Array(JsonArray::from_parts_unchecked(json, records))
                }
            }
            JsonType::String => Self::String(String::from_utf8_lossy(raw).into_owned()),
            JsonType::StringWithEscaping => Self::String(unescape(raw).into_owned()),
            JsonType::Integer => match raw.to_str().map(str::parse) {
                Ok(Ok(integer)) => Self::Integer(integer),
                _ => parse_double(raw),
            },
            JsonType::FloatingNumber => parse_double(raw),
            JsonType::BoolTrue => Self::Bool(true),
            JsonType::BoolFalse => Self::Bool(false),
            JsonType::Null => Self::Null,
        }
    }

    /// The JSON type this value is written as.
    #[must_use]
    pub fn json_type(&self) -> JsonType {
        match self {
            Self::Object(_) => JsonType::Object,
            Self::Array(_) => JsonType::Array,
            Self::String(text) => {
                if text.bytes().any(needs_escape) {
                    JsonType::StringWithEscaping
                } else {
                    JsonType::String
                }
            }
            Self::Integer(_) => JsonType::Integer,
            Self::Double(double) if double.is_finite() => JsonType::FloatingNumber,
            Self::Bool(true) => JsonType::BoolTrue,
            Self::Bool(false) => JsonType::BoolFalse,
            Self::Double(_) | Self::Null => JsonType::Null,
        }
    }

    /// Appends the JSON text of this value to `json` and its records to
    /// `records`. Record offsets are `origin + json.len()` at the time each
    /// value is written, so `origin` is where `json[0]` will land in the
    /// destination buffer.
    pub(crate) fn encode_into(&self, json: &mut Vec<u8>, records: &mut Description, origin: usize) {
        let start = origin + json.len();
        match self {
            Self::Object(object) => {
                encode_view(object.buffer(), object.description(), json, records, origin);
            }
            Self::Array(array) => {
                encode_view(array.buffer(), array.description(), json, records, origin);
            }
            Self::String(text) => encode_string(text, json, records, origin),
            Self::Integer(integer) => {
                json.extend_from_slice(integer.to_string().as_bytes());
                records.push_scalar(JsonType::Integer, Bounds::new(start, json.len() + origin - start));
            }
            Self::Double(double) if double.is_finite() => {
                // `Debug` keeps a `.0` or exponent, so the text reads back as
                // a floating-point number.
                json.extend_from_slice(format!("{double:?}").as_bytes());
                records.push_scalar(
                    JsonType::FloatingNumber,
                    Bounds::new(start, json.len() + origin - start),
                );
            }
            Self::Bool(true) => {
                json.extend_from_slice(b"true");
                records.push_scalar(JsonType::BoolTrue, Bounds::new(start, 4));
            }
            Self::Bool(false) => {
                json.extend_from_slice(b"false");
                records.push_scalar(JsonType::BoolFalse, Bounds::new(start, 5));
            }
            Self::Double(_) | Self::Null => {
                json.extend_from_slice(b"null");
                records.push_scalar(JsonType::Null, Bounds::new(start, 4));
            }
        }
    }

    /// Serializes this value into standalone JSON text.
    #[must_use]
    pub fn to_json_bytes(&self) -> Vec<u8> {
        let mut json = Vec::new();
        self.encode_into(&mut json, &mut Description::new(), 0);
        json
    }

    /// Returns `true` if the value is [`Null`](Value::Null).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// The integer, if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(integer) => Some(*integer),
            _ => None,
        }
    }

    /// The number as a double, for both integers and doubles.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(integer) => Some(*integer as f64),
            Self::Double(double) => Some(*double),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(boolean) => Some(*boolean),
            _ => None,
        }
    }

    /// The array view, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&JsonArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The object view, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// Copies the subtree at `at` into a standalone pair whose offsets start at
/// the value's first byte. The text is shared, not copied.
pub(crate) fn carve(buffer: &Buffer, description: &Description, at: usize) -> (Buffer, Description) {
    let reader = description.reader();
    let bounds = reader.data_bounds(at);
    let mut records = description.slice(at, reader.index_length(at));
    records.advance_all_json_offsets(-signed(bounds.offset));
    (buffer.slice(bounds), records)
}

/// Narrows a scanned pair to its root value.
pub(crate) fn trim_to_root(buffer: Buffer, description: Description) -> (Buffer, Description) {
    let root = description.reader().data_bounds(0);
    if root.offset == 0 && root.length == buffer.len() {
        (buffer, description)
    } else {
        carve(&buffer, &description, 0)
    }
}

fn needs_escape(byte: u8) -> bool {
    byte < 0x20 || byte == b'"' || byte == b'\\'
}

fn parse_double(raw: &[u8]) -> Value {
    raw.to_str()
        .ok()
        .and_then(|text| text.parse().ok())
        .map_or(Value::Null, Value::Double)
}

pub(crate) fn encode_string(text: &str, json: &mut Vec<u8>, records: &mut Description, origin: usize) {
    json.push(b'"');
    let start = origin + json.len();
    let escaped = escape_into(text, json);
    let length = origin + json.len() - start;
    json.push(b'"');
    let ty = if escaped {
        JsonType::StringWithEscaping
    } else {
        JsonType::String
    };
    records.push_scalar(ty, Bounds::new(start, length));
}

/// Copies a view's text and records, rebasing the records onto the position
/// the text lands at.
fn encode_view(
    buffer: &Buffer,
    description: &Description,
    json: &mut Vec<u8>,
    records: &mut Description,
    origin: usize,
) {
    let mut copied = description.clone();
    copied.advance_all_json_offsets(signed(origin + json.len()));
    json.extend_from_slice(buffer.as_bytes());
    records.extend_from(&copied);
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(object) => fmt::Display::fmt(object, f),
            Self::Array(array) => fmt::Display::fmt(array, f),
            other => fmt::Display::fmt(other.to_json_bytes().as_bstr(), f),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<JsonArray> for Value {
    fn from(v: JsonArray) -> Self {
        Self::Array(v)
    }
}

impl From<JsonObject> for Value {
    fn from(v: JsonObject) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
