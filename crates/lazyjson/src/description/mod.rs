//! The structural index of a JSON document.
//!
//! A [`Description`] is a flat byte arena holding one record per JSON value,
//! laid out in document order. Every record starts with a one-byte
//! [`JsonType`] tag followed by the byte span of the value inside the paired
//! [`Buffer`](crate::Buffer). Containers additionally store their immediate
//! child count and the size of their whole subtree in the arena, which lets a
//! reader skip a container without visiting its children.
//!
//! ```text
//! container: tag | json offset | json length | child count | index length   (17 bytes)
//! scalar:    tag | json offset | json length                                 ( 9 bytes)
//! ```
//!
//! All integers are little-endian `u32`. Offsets are relative to the start
//! of the paired buffer window. String records cover the text between the
//! quotes; container records cover the brackets. Object members are stored
//! as a key record immediately followed by the value's records, and the
//! object's child count is the number of members.

mod reader;

use alloc::vec::Vec;
use core::{fmt, ops::Range};

pub use reader::{Children, ReadIndex};

pub(crate) const TAG: usize = 0;
pub(crate) const JSON_OFFSET: usize = 1;
pub(crate) const JSON_LENGTH: usize = 5;
pub(crate) const CHILD_COUNT: usize = 9;
pub(crate) const INDEX_LENGTH: usize = 13;

/// Size of a container record.
pub const CONTAINER_RECORD_LEN: usize = 17;
/// Size of a scalar record.
pub const SCALAR_RECORD_LEN: usize = 9;

/// The type tag stored at the start of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JsonType {
    /// `{...}`
    Object = 0,
    /// `[...]`
    Array = 1,
    /// A string without escape sequences.
    String = 2,
    /// A string whose raw text contains at least one escape sequence.
    StringWithEscaping = 3,
    /// A number that fits an `i64` and has no fraction or exponent.
    Integer = 4,
    /// Any other number.
    FloatingNumber = 5,
    /// `true`
    BoolTrue = 6,
    /// `false`
    BoolFalse = 7,
    /// `null`
    Null = 8,
}

impl JsonType {
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Object,
            1 => Self::Array,
            2 => Self::String,
            3 => Self::StringWithEscaping,
            4 => Self::Integer,
            5 => Self::FloatingNumber,
            6 => Self::BoolTrue,
            7 => Self::BoolFalse,
            8 => Self::Null,
            _ => return None,
        })
    }

    /// Returns `true` for objects and arrays.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Returns `true` for both string tags.
    #[must_use]
    pub fn is_string(self) -> bool {
        matches!(self, Self::String | Self::StringWithEscaping)
    }

    pub(crate) fn record_len(self) -> usize {
        if self.is_container() {
            CONTAINER_RECORD_LEN
        } else {
            SCALAR_RECORD_LEN
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String | Self::StringWithEscaping => "string",
            Self::Integer => "integer",
            Self::FloatingNumber => "floating-point number",
            Self::BoolTrue | Self::BoolFalse => "boolean",
            Self::Null => "null",
        })
    }
}

/// A byte span inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    /// First byte of the span.
    pub offset: usize,
    /// Number of bytes in the span.
    pub length: usize,
}

impl Bounds {
    /// Creates a span of `length` bytes starting at `offset`.
    #[must_use]
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// One past the last byte of the span.
    #[must_use]
    pub const fn end(self) -> usize {
        self.offset + self.length
    }

    /// The span as a range.
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// A flat, binary index of a JSON document's structure.
///
/// See the [module documentation](self) for the record layout. Read access
/// goes through [`Description::reader`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Description {
    bytes: Vec<u8>,
}

impl Description {
    /// Creates an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// A read-only view over the records.
    #[must_use]
    pub fn reader(&self) -> ReadIndex<'_> {
        ReadIndex::new(&self.bytes)
    }

    /// Size of the arena in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the arena holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw arena.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    // ── encoding ────────────────────────────────────────────────────────

    pub(crate) fn push_scalar(&mut self, ty: JsonType, bounds: Bounds) {
        debug_assert!(!ty.is_container());
        self.bytes.push(ty as u8);
        push_u32(&mut self.bytes, bounds.offset);
        push_u32(&mut self.bytes, bounds.length);
    }

    /// Writes a container header whose length and counts are filled in by
    /// [`Description::close_container`]. Returns the header's offset.
    pub(crate) fn open_container(&mut self, ty: JsonType, json_offset: usize) -> usize {
        debug_assert!(ty.is_container());
        let at = self.bytes.len();
        self.bytes.push(ty as u8);
        push_u32(&mut self.bytes, json_offset);
        self.bytes.extend_from_slice(&[0; 12]);
        at
    }

    pub(crate) fn close_container(&mut self, at: usize, json_end: usize, child_count: usize) {
        let json_offset = read_u32(&self.bytes, at + JSON_OFFSET);
        let index_length = self.bytes.len() - at;
        write_u32(&mut self.bytes, at + JSON_LENGTH, json_end - json_offset);
        write_u32(&mut self.bytes, at + CHILD_COUNT, child_count);
        write_u32(&mut self.bytes, at + INDEX_LENGTH, index_length);
    }

    // ── field updates ───────────────────────────────────────────────────

    pub(crate) fn adjust_json_length(&mut self, at: usize, delta: isize) {
        let length = read_u32(&self.bytes, at + JSON_LENGTH);
        write_u32(&mut self.bytes, at + JSON_LENGTH, shifted(length, delta));
    }

    pub(crate) fn adjust_child_count(&mut self, at: usize, delta: isize) {
        let count = read_u32(&self.bytes, at + CHILD_COUNT);
        write_u32(&mut self.bytes, at + CHILD_COUNT, shifted(count, delta));
    }

    pub(crate) fn adjust_index_length(&mut self, at: usize, delta: isize) {
        let length = read_u32(&self.bytes, at + INDEX_LENGTH);
        write_u32(&mut self.bytes, at + INDEX_LENGTH, shifted(length, delta));
    }

    /// Shifts the JSON offset of every record in `records` by `delta`.
    ///
    /// `records` must start on a record boundary.
    pub(crate) fn shift_json_offsets(&mut self, records: Range<usize>, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut at = records.start;
        while at < records.end {
            let Some(ty) = JsonType::from_tag(self.bytes[at + TAG]) else {
                debug_assert!(false, "invalid record tag at {at}");
                return;
            };
            let offset = read_u32(&self.bytes, at + JSON_OFFSET);
            write_u32(&mut self.bytes, at + JSON_OFFSET, shifted(offset, delta));
            at += ty.record_len();
        }
    }

    /// Rebases every record by `delta`.
    pub(crate) fn advance_all_json_offsets(&mut self, delta: isize) {
        self.shift_json_offsets(0..self.bytes.len(), delta);
    }

    /// Copies `length` arena bytes starting at `at` into a new description.
    pub(crate) fn slice(&self, at: usize, length: usize) -> Self {
        Self {
            bytes: self.bytes[at..at + length].to_vec(),
        }
    }

    /// Releases spare capacity left over from scanning.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.bytes.shrink_to_fit();
    }

    pub(crate) fn splice(&mut self, range: Range<usize>, records: &[u8]) {
        self.bytes.splice(range, records.iter().copied());
    }

    /// Appends another description's records verbatim.
    pub(crate) fn extend_from(&mut self, other: &Self) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Verifies the structural invariants against a buffer of `json_len`
    /// bytes: every span lies inside the buffer and inside its parent,
    /// siblings are ordered without overlap, child counts match and index
    /// lengths add up.
    #[cfg(any(test, feature = "fuzzing"))]
    #[doc(hidden)]
    pub fn check_consistency(&self, json_len: usize) -> Result<(), &'static str> {
        fn check(
            reader: &ReadIndex<'_>,
            at: usize,
            parent: Bounds,
        ) -> Result<usize, &'static str> {
            let ty = reader.json_type(at).ok_or("invalid record tag")?;
            let bounds = reader.data_bounds(at);
            if bounds.offset < parent.offset || bounds.end() > parent.end() {
                return Err("record span escapes its parent");
            }
            if !ty.is_container() {
                return Ok(at + SCALAR_RECORD_LEN);
            }

            let end = at + reader.index_length(at);
            let per_child = if ty == JsonType::Object { 2 } else { 1 };
            let mut cursor = at + CONTAINER_RECORD_LEN;
            let mut previous_end = bounds.offset + 1;
            let mut visited = 0;
            while cursor < end {
                let child = reader.data_bounds(cursor);
                if child.offset < previous_end {
                    return Err("sibling spans overlap");
                }
                if ty == JsonType::Object && visited % 2 == 0 {
                    let key_type = reader.json_type(cursor);
                    if !key_type.is_some_and(JsonType::is_string) {
                        return Err("object key is not a string");
                    }
                }
                previous_end = child.end();
                cursor = check(reader, cursor, Bounds::new(bounds.offset, bounds.length))?;
                visited += 1;
            }
            if cursor != end {
                return Err("index length does not end on a record boundary");
            }
            if previous_end > bounds.end().saturating_sub(1) {
                return Err("child span overlaps the closing bracket");
            }
            if visited != reader.child_count(at) * per_child {
                return Err("child count does not match the records");
            }
            Ok(end)
        }

        if self.is_empty() {
            return Ok(());
        }
        let reader = self.reader();
        let end = check(&reader, 0, Bounds::new(0, json_len))?;
        if end == self.len() {
            Ok(())
        } else {
            Err("records after the root value")
        }
    }
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reader = self.reader();
        let mut list = f.debug_list();
        let mut at = 0;
        while let Some(ty) = reader.json_type(at) {
            let bounds = reader.data_bounds(at);
            if ty.is_container() {
                list.entry(&format_args!(
                    "{at}: {ty:?} {}..{} count={} index_length={}",
                    bounds.offset,
                    bounds.end(),
                    reader.child_count(at),
                    reader.index_length(at)
                ));
            } else {
                list.entry(&format_args!("{at}: {ty:?} {}..{}", bounds.offset, bounds.end()));
            }
            at += ty.record_len();
        }
        list.finish()
    }
}

pub(crate) fn read_u32(bytes: &[u8], at: usize) -> usize {
    let mut word = [0; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word) as usize
}

/// Returns `true` if `value` can be stored in a record field and used as a
/// signed delta.
pub(crate) fn fits_record_field(value: usize) -> bool {
    u32::try_from(value).is_ok() && isize::try_from(value).is_ok()
}

fn to_field(value: usize) -> [u8; 4] {
    u32::try_from(value)
        .unwrap_or_else(|_| panic!("{value} does not fit a record field"))
        .to_le_bytes()
}

fn write_u32(bytes: &mut [u8], at: usize, value: usize) {
    bytes[at..at + 4].copy_from_slice(&to_field(value));
}

fn push_u32(bytes: &mut Vec<u8>, value: usize) {
    bytes.extend_from_slice(&to_field(value));
}

/// Converts a length inside an indexed document to a signed delta.
///
/// [`scan`](crate::scan) rejects documents that fail
/// [`fits_record_field`], and every edit checks the edited lengths before it
/// commits, so the conversion cannot wrap.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn signed(length: usize) -> isize {
    length as isize
}

fn shifted(value: usize, delta: isize) -> usize {
    value
        .checked_add_signed(delta)
        .unwrap_or_else(|| panic!("record field {value} shifted by {delta} underflows"))
}
