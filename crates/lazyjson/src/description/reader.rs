use super::{
    CHILD_COUNT, CONTAINER_RECORD_LEN, INDEX_LENGTH, JSON_LENGTH, JSON_OFFSET, JsonType,
    SCALAR_RECORD_LEN, read_u32,
};
use crate::{Bounds, escape};

/// Read-only traversal over a [`Description`](super::Description).
///
/// All offsets taken and returned by a `ReadIndex` are positions in the
/// description arena ("record offsets"), except for the JSON spans returned
/// by [`ReadIndex::data_bounds`], which are positions in the paired buffer.
///
/// Methods that read a record panic if no record starts at the given offset.
#[derive(Debug, Clone, Copy)]
pub struct ReadIndex<'a> {
    bytes: &'a [u8],
}

impl<'a> ReadIndex<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The type of the record at `at`, or `None` if no record starts there.
    #[must_use]
    pub fn json_type(&self, at: usize) -> Option<JsonType> {
        self.bytes.get(at).copied().and_then(JsonType::from_tag)
    }

    pub(crate) fn record_type(&self, at: usize) -> JsonType {
        self.json_type(at)
            .unwrap_or_else(|| panic!("no record starts at description offset {at}"))
    }

    /// The byte span of the value described at `at`.
    #[must_use]
    pub fn data_bounds(&self, at: usize) -> Bounds {
        Bounds::new(
            read_u32(self.bytes, at + JSON_OFFSET),
            read_u32(self.bytes, at + JSON_LENGTH),
        )
    }

    /// The span of the value's raw text at `at`, including the quotes around
    /// strings.
    #[must_use]
    pub fn raw_bounds(&self, at: usize) -> Bounds {
        let bounds = self.data_bounds(at);
        if self.record_type(at).is_string() {
            Bounds::new(bounds.offset - 1, bounds.length + 2)
        } else {
            bounds
        }
    }

    /// Number of arena bytes used by the subtree rooted at `at`, including
    /// its own record.
    #[must_use]
    pub fn index_length(&self, at: usize) -> usize {
        if self.record_type(at).is_container() {
            read_u32(self.bytes, at + INDEX_LENGTH)
        } else {
            SCALAR_RECORD_LEN
        }
    }

    /// Immediate child count of the container at `at`; zero for scalars.
    ///
    /// For objects this is the number of members, not the number of records.
    #[must_use]
    pub fn child_count(&self, at: usize) -> usize {
        if self.record_type(at).is_container() {
            read_u32(self.bytes, at + CHILD_COUNT)
        } else {
            0
        }
    }

    /// Advances `at` past one complete value.
    pub fn skip(&self, at: &mut usize) {
        *at += self.index_length(*at);
    }

    /// Immediate child count of the root container.
    #[must_use]
    pub fn array_object_count(&self) -> usize {
        self.child_count(0)
    }

    /// Record offset of the root container's `index`th element.
    ///
    /// For an object this is the offset of the `index`th member's key record;
    /// its value record follows immediately. Linear in `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`ReadIndex::array_object_count`].
    #[must_use]
    pub fn offset_for_index(&self, index: usize) -> usize {
        let count = self.array_object_count();
        assert!(
            index < count,
            "index out of bounds: the len is {count} but the index is {index}"
        );
        let records = match self.record_type(0) {
            JsonType::Object => index * 2,
            _ => index,
        };
        let mut at = CONTAINER_RECORD_LEN;
        for _ in 0..records {
            self.skip(&mut at);
        }
        at
    }

    /// Record offset of the key of the root object's first member named
    /// `key`, searched against the paired `json` text.
    ///
    /// Plain keys compare by raw bytes; keys containing escapes are decoded
    /// first.
    #[must_use]
    pub fn find_key(&self, key: &str, json: &[u8]) -> Option<usize> {
        debug_assert_eq!(self.json_type(0), Some(JsonType::Object));
        self.children(0).find(|&at| {
            let raw = &json[self.data_bounds(at).range()];
            match self.json_type(at) {
                Some(JsonType::String) => raw == key.as_bytes(),
                Some(JsonType::StringWithEscaping) => escape::unescape(raw) == key,
                _ => false,
            }
        })
    }

    /// Iterates over the record offsets of the container at `at`'s
    /// immediate children. Object members yield their key records.
    #[must_use]
    pub fn children(&self, at: usize) -> Children<'a> {
        let stride = if self.json_type(at) == Some(JsonType::Object) {
            2
        } else {
            1
        };
        Children {
            reader: *self,
            cursor: at + CONTAINER_RECORD_LEN,
            remaining: self.child_count(at),
            stride,
        }
    }
}

/// Iterator returned by [`ReadIndex::children`].
#[derive(Debug, Clone)]
pub struct Children<'a> {
    reader: ReadIndex<'a>,
    cursor: usize,
    remaining: usize,
    stride: usize,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let at = self.cursor;
        for _ in 0..self.stride {
            self.reader.skip(&mut self.cursor);
        }
        Some(at)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}
