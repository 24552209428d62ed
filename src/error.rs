//! Errors the translator itself can raise, distinct from the interpreter's
//! in-band [`crate::common::Status`]/[`crate::common::ErrorKind`], which
//! never panics or returns a Rust `Result` once dispatch has started.

use thiserror::Error;

/// Raised by [`crate::translator::validate`] before a translation is
/// attempted. Callers map this to `Status::Error(ErrorKind::InvalidCode)`
/// rather than letting it surface past [`crate::execute`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateError {
    #[error("code size {len} exceeds the maximum of {max} bytes")]
    CodeTooLarge { len: usize, max: usize },
}
