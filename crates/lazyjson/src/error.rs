use thiserror::Error;

use crate::JsonType;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A recoverable failure caused by the input data.
///
/// Misuse of the API, such as indexing past the end of an array, is not an
/// `Error`: it panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input is not a single valid JSON document.
    #[error("malformed JSON at byte {offset}: {reason}")]
    Malformed {
        /// Byte offset at which scanning stopped.
        offset: usize,
        /// What the scanner rejected.
        reason: SyntaxError,
    },
    /// The document is valid JSON but its root is not the requested kind.
    #[error("expected {expected} at the document root, found {found}")]
    TypeMismatch {
        /// The container kind the caller asked for.
        expected: JsonType,
        /// The type of the scanned root value.
        found: JsonType,
    },
}

/// The reason a document was rejected by [`scan`](crate::scan).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// The input is not UTF-8.
    #[error("invalid UTF-8")]
    InvalidUtf8,
    /// A byte that cannot start or continue the expected token.
    #[error("unexpected byte {0:#04x}")]
    UnexpectedByte(u8),
    /// The input ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// A backslash followed by a character that is not an escape.
    #[error("invalid escape sequence")]
    InvalidEscape,
    /// A `\u` escape without four hex digits.
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscape,
    /// A raw control character inside a string.
    #[error("unescaped control character {0:#04x} in string")]
    ControlCharacter(u8),
    /// A number that does not follow the JSON grammar.
    #[error("invalid number")]
    InvalidNumber,
    /// Anything but whitespace after the root value.
    #[error("trailing content after the root value")]
    TrailingContent,
    /// More open containers than [`ParseOptions::max_depth`](crate::ParseOptions::max_depth).
    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
    /// The input is too long for the 32-bit record fields.
    #[error("document of {0} bytes exceeds the 4 GiB index limit")]
    DocumentTooLarge(usize),
}

impl SyntaxError {
    pub(crate) fn at(self, offset: usize) -> Error {
        Error::Malformed {
            offset,
            reason: self,
        }
    }
}
