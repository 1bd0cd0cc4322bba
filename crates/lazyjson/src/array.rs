use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator, str::FromStr};

use bstr::ByteSlice;

use crate::{
    Buffer, Children, Description, Error, JsonType, ParseOptions, Result, Value, mutation,
    scanner::describe, value::trim_to_root,
};

/// A lazily decoded JSON array.
///
/// The array keeps its raw text and structural index side by side. Reading
/// an element decodes only that element; nested containers come back as their
/// own views, backed by the same shared text. Writes edit the text and the
/// index in place.
///
/// # Examples
///
/// ```rust
/// use lazyjson::{JsonArray, Value};
///
/// let mut array = JsonArray::from_bytes(b"[1, 2, 3]")?;
/// array.remove(0);
/// array.push("four");
/// assert_eq!(array.to_string(), r#"[2, 3,"four"]"#);
/// assert_eq!(array.get(2), Value::from("four"));
/// # Ok::<(), lazyjson::Error>(())
/// ```
#[derive(Clone)]
pub struct JsonArray {
    buffer: Buffer,
    description: Description,
}

impl JsonArray {
    /// Creates an empty array, `[]`.
    #[must_use]
    pub fn new() -> Self {
        let mut description = Description::new();
        let header = description.open_container(JsonType::Array, 0);
        description.close_container(header, 2, 0);
        Self::from_parts_unchecked(Buffer::from(&b"[]"[..]), description)
    }

    /// Scans `json` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for invalid JSON and
    /// [`Error::TypeMismatch`] if the root is not an array.
    pub fn from_bytes(json: &[u8]) -> Result<Self> {
        Self::with_options(json, &ParseOptions::default())
    }

    /// Scans `json` with the given options.
    ///
    /// # Errors
    ///
    /// Same as [`JsonArray::from_bytes`].
    pub fn with_options(json: &[u8], options: &ParseOptions) -> Result<Self> {
        let description = describe(json, options)?;
        Self::from_parts(Buffer::from(json), description)
    }

    /// Wraps a scanned pair. Whitespace around the root value is dropped
    /// from the view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the root record is not an array.
    ///
    /// # Panics
    ///
    /// Panics if `description` is empty.
    pub fn from_parts(buffer: Buffer, description: Description) -> Result<Self> {
        match description.reader().json_type(0) {
            Some(JsonType::Array) => {
                let (buffer, description) = trim_to_root(buffer, description);
                Ok(Self::from_parts_unchecked(buffer, description))
            }
            Some(found) => Err(Error::TypeMismatch {
                expected: JsonType::Array,
                found,
            }),
            None => panic!("cannot wrap an empty description"),
        }
    }

    pub(crate) fn from_parts_unchecked(buffer: Buffer, description: Description) -> Self {
        debug_assert_eq!(description.reader().json_type(0), Some(JsonType::Array));
        Self {
            buffer,
            description,
        }
    }

    /// Number of elements, read from the header.
    #[must_use]
    pub fn len(&self) -> usize {
        self.description.reader().array_object_count()
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> Value {
        let at = self.description.reader().offset_for_index(index);
        Value::materialize(&self.buffer, &self.description, at)
    }

    /// Replaces the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) {
        let at = self.description.reader().offset_for_index(index);
        mutation::rewrite(&mut self.buffer, &mut self.description, &value.into(), at);
    }

    /// Removes the element at `index` and the separator next to it.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn remove(&mut self, index: usize) {
        let at = self.description.reader().offset_for_index(index);
        mutation::remove(&mut self.buffer, &mut self.description, at);
    }

    /// Inserts `value` so that it ends up at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()`.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) {
        mutation::insert(
            &mut self.buffer,
            &mut self.description,
            &value.into(),
            0,
            index,
            None,
        );
    }

    /// Appends `value`.
    pub fn push(&mut self, value: impl Into<Value>) {
        let len = self.len();
        self.insert(len, value);
    }

    /// Iterates over the elements in order.
    #[must_use]
    pub fn iter(&self) -> ArrayIter<'_> {
        ArrayIter {
            array: self,
            children: self.description.reader().children(0),
        }
    }

    /// The JSON text of this array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Copies the JSON text of this array.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// The underlying text.
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The structural index, with offsets relative to [`JsonArray::buffer`].
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

impl Default for JsonArray {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for JsonArray {
    type Err = Error;

    fn from_str(json: &str) -> Result<Self> {
        Self::from_bytes(json.as_bytes())
    }
}

impl PartialEq for JsonArray {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Display for JsonArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_bytes().as_bstr(), f)
    }
}

impl fmt::Debug for JsonArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a JsonArray {
    type Item = Value;
    type IntoIter = ArrayIter<'a>;

    fn into_iter(self) -> ArrayIter<'a> {
        self.iter()
    }
}

/// Iterator over the elements of a [`JsonArray`].
#[derive(Clone)]
pub struct ArrayIter<'a> {
    array: &'a JsonArray,
    children: Children<'a>,
}

impl Iterator for ArrayIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let at = self.children.next()?;
        Some(Value::materialize(
            &self.array.buffer,
            &self.array.description,
            at,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl ExactSizeIterator for ArrayIter<'_> {}

impl FusedIterator for ArrayIter<'_> {}

impl fmt::Debug for ArrayIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayIter")
            .field("remaining", &self.children.len())
            .finish()
    }
}
