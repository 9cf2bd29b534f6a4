//! Program-level errors.
//!
//! These are misuse of the form API or a schema that disagrees with its
//! typed output. User input problems are never reported here; they are
//! [`FieldErrors`](super::FieldErrors) returned as data.

use thiserror::Error;

use crate::path::{FieldPath, PathError};

/// Errors returned by form-state and list operations.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("index {index} is out of bounds at '{path}' (length {len})")]
    IndexOutOfBounds {
        path: FieldPath,
        index: usize,
        len: usize,
    },

    #[error("cannot descend into '{path}': value is neither an object nor a list")]
    NotAContainer { path: FieldPath },

    #[error("'{0}' is not a registered list")]
    UnknownList(FieldPath),

    #[error("'{0}' is already registered as a list")]
    DuplicateList(FieldPath),

    #[error("invalid schema pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid form configuration: {0}")]
    Config(#[source] serde_json::Error),

    #[error("validated values do not match the output type: {0}")]
    Decode(#[source] serde_json::Error),
}
