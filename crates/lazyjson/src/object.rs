use alloc::{string::String, vec::Vec};
use core::{fmt, iter::FusedIterator, str::FromStr};

use bstr::ByteSlice;

use crate::{
    Buffer, Children, Description, Error, JsonType, ParseOptions, Result, Value,
    description::SCALAR_RECORD_LEN, escape::unescape, mutation, scanner::describe,
    value::trim_to_root,
};

/// A lazily decoded JSON object.
///
/// Lookup is linear and returns the first member whose key matches. Members
/// keep their document order; keys added through [`JsonObject::set`] are
/// appended at the end.
///
/// # Examples
///
/// ```rust
/// use lazyjson::{JsonObject, Value};
///
/// let mut object: JsonObject = r#"{"name": "lazy", "tags": []}"#.parse()?;
/// object.set("name", "json");
/// object.set("version", 1);
/// assert!(object.remove("tags"));
/// assert_eq!(object.to_string(), r#"{"name": "json", "version":1}"#);
/// assert_eq!(object.keys().collect::<Vec<_>>(), ["name", "version"]);
/// # Ok::<(), lazyjson::Error>(())
/// ```
#[derive(Clone)]
pub struct JsonObject {
    buffer: Buffer,
    description: Description,
}

impl JsonObject {
    /// Creates an empty object, `{}`.
    #[must_use]
    pub fn new() -> Self {
        let mut description = Description::new();
        let header = description.open_container(JsonType::Object, 0);
        description.close_container(header, 2, 0);
        Self::from_parts_unchecked(Buffer::from(&b"{}"[..]), description)
    }

    /// Scans `json` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for invalid JSON and
    /// [`Error::TypeMismatch`] if the root is not an object.
    pub fn from_bytes(json: &[u8]) -> Result<Self> {
        Self::with_options(json, &ParseOptions::default())
    }

    /// Scans `json` with the given options.
    ///
    /// # Errors
    ///
    /// Same as [`JsonObject::from_bytes`].
    pub fn with_options(json: &[u8], options: &ParseOptions) -> Result<Self> {
        let description = describe(json, options)?;
        Self::from_parts(Buffer::from(json), description)
    }

    /// Wraps a scanned pair. Whitespace around the root value is dropped
    /// from the view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the root record is not an object.
    ///
    /// # Panics
    ///
    /// Panics if `description` is empty.
    pub fn from_parts(buffer: Buffer, description: Description) -> Result<Self> {
        match description.reader().json_type(0) {
            Some(JsonType::Object) => {
                let (buffer, description) = trim_to_root(buffer, description);
                Ok(Self::from_parts_unchecked(buffer, description))
            }
            Some(found) => Err(Error::TypeMismatch {
                expected: JsonType::Object,
                found,
            }),
            None => panic!("cannot wrap an empty description"),
        }
    }

    pub(crate) fn from_parts_unchecked(buffer: Buffer, description: Description) -> Self {
        debug_assert_eq!(description.reader().json_type(0), Some(JsonType::Object));
        Self {
            buffer,
            description,
        }
    }

    /// Number of members, read from the header.
    #[must_use]
    pub fn len(&self) -> usize {
        self.description.reader().array_object_count()
    }

    /// Returns `true` if the object has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, key: &str) -> Option<usize> {
        self.description
            .reader()
            .find_key(key, self.buffer.as_bytes())
    }

    /// Decodes the value of the first member named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let at = self.find(key)?;
        Some(Value::materialize(
            &self.buffer,
            &self.description,
            at + SCALAR_RECORD_LEN,
        ))
    }

    /// Returns `true` if a member named `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Replaces the value of the first member named `key`, or appends a new
    /// member if there is none.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.find(key) {
            Some(at) => mutation::rewrite(
                &mut self.buffer,
                &mut self.description,
                &value,
                at + SCALAR_RECORD_LEN,
            ),
            None => {
                let len = self.len();
                mutation::insert(
                    &mut self.buffer,
                    &mut self.description,
                    &value,
                    0,
                    len,
                    Some(key),
                );
            }
        }
    }

    /// Removes the first member named `key`. Returns whether one was found.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(at) = self.find(key) else {
            return false;
        };
        mutation::remove(&mut self.buffer, &mut self.description, at);
        true
    }

    /// Iterates over the decoded keys in document order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            object: self,
            children: self.description.reader().children(0),
        }
    }

    /// Iterates over `(key, value)` pairs in document order.
    #[must_use]
    pub fn iter(&self) -> ObjectIter<'_> {
        ObjectIter {
            object: self,
            children: self.description.reader().children(0),
        }
    }

    fn key_at(&self, at: usize) -> String {
        let raw = &self.buffer.as_bytes()[self.description.reader().data_bounds(at).range()];
        unescape(raw).into_owned()
    }

    /// The JSON text of this object.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Copies the JSON text of this object.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// The underlying text.
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The structural index, with offsets relative to [`JsonObject::buffer`].
    #[must_use]
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Consumes the view, returning its text.
    #[must_use]
    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }

    /// Consumes the view, returning its text and index.
    #[must_use]
    pub fn into_parts(self) -> (Buffer, Description) {
        (self.buffer, self.description)
    }
}

impl Default for JsonObject {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for JsonObject {
    type Err = Error;

    fn from_str(json: &str) -> Result<Self> {
        Self::from_bytes(json.as_bytes())
    }
}

/// Objects are equal when they hold the same members in the same order.
impl PartialEq for JsonObject {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Display for JsonObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_bytes().as_bstr(), f)
    }
}

impl fmt::Debug for JsonObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a JsonObject {
    type Item = (String, Value);
    type IntoIter = ObjectIter<'a>;

    fn into_iter(self) -> ObjectIter<'a> {
        self.iter()
    }
}

/// Iterator over the members of a [`JsonObject`].
#[derive(Clone)]
pub struct ObjectIter<'a> {
    object: &'a JsonObject,
    children: Children<'a>,
}

impl Iterator for ObjectIter<'_> {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.children.next()?;
        let value = Value::materialize(
            &self.object.buffer,
            &self.object.description,
            at + SCALAR_RECORD_LEN,
        );
        Some((self.object.key_at(at), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl ExactSizeIterator for ObjectIter<'_> {}

impl FusedIterator for ObjectIter<'_> {}

impl fmt::Debug for ObjectIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectIter")
            .field("remaining", &self.children.len())
            .finish()
    }
}

/// Iterator over the keys of a [`JsonObject`].
#[derive(Clone)]
pub struct Keys<'a> {
    object: &'a JsonObject,
    children: Children<'a>,
}

impl Iterator for Keys<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let at = self.children.next()?;
        Some(self.object.key_at(at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

impl FusedIterator for Keys<'_> {}

impl fmt::Debug for Keys<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("remaining", &self.children.len())
            .finish()
    }
}
