/// Configuration for [`scan`](crate::scan) and the view constructors.
///
/// # Examples
///
/// ```rust
/// use lazyjson::{Error, JsonArray, ParseOptions, SyntaxError};
///
/// let options = ParseOptions { max_depth: 2 };
/// assert!(JsonArray::with_options(b"[[1]]", &options).is_ok());
/// assert!(matches!(
///     JsonArray::with_options(b"[[[1]]]", &options),
///     Err(Error::Malformed {
///         reason: SyntaxError::DepthLimitExceeded(2),
///         ..
///     })
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth of objects and arrays.
    ///
    /// The root container counts as depth one. Deeper documents are rejected
    /// with [`SyntaxError::DepthLimitExceeded`](crate::SyntaxError::DepthLimitExceeded).
    ///
    /// # Default
    ///
    /// `128`
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}
