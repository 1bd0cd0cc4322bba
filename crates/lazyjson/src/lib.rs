//! Lazily materialized, mutable views over JSON documents.
//!
//! A document is scanned once into two parallel values: a [`Buffer`] holding
//! the raw JSON text and a [`Description`], a flat binary index recording the
//! type, byte span and subtree size of every value. [`JsonArray`] and
//! [`JsonObject`] wrap such a pair and decode values only when they are read.
//! Edits splice both the text and the index in place, so a mutated view never
//! needs to be re-parsed.
//!
//! ```rust
//! use lazyjson::{JsonArray, Value};
//!
//! let mut array: JsonArray = "[1, [2, 3], \"four\"]".parse().unwrap();
//! assert_eq!(array.len(), 3);
//!
//! let inner = array.get(1);
//! assert_eq!(inner.as_array().map(|a| a.get(0)), Some(Value::Integer(2)));
//!
//! array.remove(0);
//! array.set(1, "five");
//! assert_eq!(array.to_string(), r#"[[2, 3], "five"]"#);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

mod array;
mod buffer;
mod description;
mod error;
mod escape;
mod mutation;
mod object;
mod options;
mod scanner;
mod value;

#[cfg(feature = "serde")]
mod ser;

#[cfg(test)]
mod tests;

pub use array::{ArrayIter, JsonArray};
pub use buffer::Buffer;
pub use description::{Bounds, Children, Description, JsonType, ReadIndex};
pub use error::{Error, Result, SyntaxError};
pub use escape::{escape_into, unescape};
pub use object::{JsonObject, Keys, ObjectIter};
pub use options::ParseOptions;
pub use scanner::scan;
pub use value::Value;
