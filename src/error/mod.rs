//! Error types.
//!
//! Validation failures are values ([`FieldError`], [`FieldErrors`],
//! [`ErrorMap`]); [`FormError`] covers API misuse and schema definition
//! mistakes.

mod field_error;
mod form_error;

pub use field_error::{ErrorMap, FieldError, FieldErrors};
pub use form_error::FormError;
