use alloc::{sync::Arc, vec::Vec};
use core::{fmt, ops::Range};

use bstr::ByteSlice;

use crate::Bounds;

/// Shared JSON text.
///
/// A `Buffer` is a window into a reference-counted allocation. Slicing a
/// buffer never copies: the slice shares the allocation and only narrows the
/// window. Edits go through [`Buffer::splice`]. A buffer that is the sole
/// owner of its whole allocation is edited in place; otherwise the result is
/// written into a fresh allocation so every other holder keeps observing the
/// old text.
#[derive(Clone)]
pub struct Buffer {
    bytes: Arc<Vec<u8>>,
    start: usize,
    len: usize,
}

impl Buffer {
    /// Wraps `bytes` in a new shared allocation.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = Arc::new(bytes.into());
        let len = bytes.len();
        Self {
            bytes,
            start: 0,
            len,
        }
    }

    /// Number of bytes visible through this buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes visible through this buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.start..self.start + self.len]
    }

    /// Returns a view of `bounds` that shares this buffer's allocation.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` reaches past the end of the window.
    #[must_use]
    pub fn slice(&self, bounds: Bounds) -> Self {
        assert!(
            bounds.end() <= self.len,
            "slice {}..{} out of range for buffer of length {}",
            bounds.offset,
            bounds.end(),
            self.len
        );
        Self {
            bytes: Arc::clone(&self.bytes),
            start: self.start + bounds.offset,
            len: bounds.length,
        }
    }

    /// Returns `true` if another buffer shares this allocation.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.bytes) > 1
    }

    /// Replaces `range` of the window with `replacement`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not inside the window. The buffer is untouched
    /// in that case.
    pub(crate) fn splice(&mut self, range: Range<usize>, replacement: &[u8]) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "splice {}..{} out of range for buffer of length {}",
            range.start,
            range.end,
            self.len
        );
        let whole = self.start == 0 && self.len == self.bytes.len();
        if whole {
            if let Some(bytes) = Arc::get_mut(&mut self.bytes) {
                bytes.splice(range, replacement.iter().copied());
                self.len = bytes.len();
                return;
            }
        }

        let current = self.as_bytes();
        let mut staged = Vec::with_capacity(current.len() - range.len() + replacement.len());
        staged.extend_from_slice(&current[..range.start]);
        staged.extend_from_slice(replacement);
        staged.extend_from_slice(&current[range.end..]);
        *self = Self::from(staged);
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("start", &self.start)
            .field("bytes", &self.as_bytes().as_bstr())
            .finish()
    }
}
