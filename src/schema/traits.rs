//! Traits for schema polymorphism.

use serde_json::Value;
use stillwater::Validation;

use crate::error::FieldErrors;
use crate::path::FieldPath;

/// A schema that validates one JSON value.
///
/// Implemented by every field schema so they can be nested inside
/// [`ObjectSchema`](super::ObjectSchema) and [`ArraySchema`](super::ArraySchema).
///
/// # Example
///
/// ```rust
/// use userform::{FieldPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::string().non_empty().error("Name is required.");
/// assert_eq!(schema.missing_message().as_deref(), Some("Name is required."));
/// assert!(SchemaLike::validate(&schema, &json!("Ana"), &FieldPath::root()).is_success());
/// ```
pub trait SchemaLike: Send + Sync {
    /// The normalized output of a successful pass.
    type Output;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Self::Output, FieldErrors>;

    /// Validates and returns the normalized value as JSON, so fields with
    /// different output types can live in one object schema.
    fn validate_to_value(&self, value: &Value, path: &FieldPath)
        -> Validation<Value, FieldErrors>;

    /// Message reported when a required field holding this schema is absent.
    ///
    /// `None` lets the enclosing object fall back to its generic message.
    fn missing_message(&self) -> Option<String> {
        None
    }
}
