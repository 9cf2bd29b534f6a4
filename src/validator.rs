//! Whole-form validation into typed values.
//!
//! A [`Validator`] runs an [`ObjectSchema`] over the entire candidate object
//! and, on success, deserializes the normalized object into `T`.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{FormError, FieldErrors};
use crate::path::FieldPath;
use crate::schema::ObjectSchema;
use crate::ValidationResult;

/// Validates candidate form values against a schema and produces `T`.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use serde_json::json;
/// use userform::{Schema, Validator};
///
/// #[derive(Deserialize)]
/// struct Job {
///     months: u32,
/// }
///
/// let validator: Validator<Job> =
///     Validator::new(Schema::object().field("months", Schema::integer().coerce().min(1)));
///
/// let job = validator.validate(&json!({"months": "6"})).unwrap().into_result().unwrap();
/// assert_eq!(job.months, 6);
/// ```
pub struct Validator<T> {
    schema: ObjectSchema,
    _output: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Validator<T> {
    pub fn new(schema: ObjectSchema) -> Self {
        Self {
            schema,
            _output: PhantomData,
        }
    }

    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    /// Runs one validation pass over `values`.
    ///
    /// Invalid input is returned as `Ok(Validation::Failure(..))`. `Err` means
    /// the schema accepted values that `T` cannot represent, which is a
    /// mismatch between schema and type rather than bad input.
    pub fn validate(&self, values: &Value) -> Result<ValidationResult<T>, FormError> {
        match self.schema.validate(values, &FieldPath::root()) {
            Validation::Success(normalized) => serde_json::from_value(Value::Object(normalized))
                .map(Validation::Success)
                .map_err(FormError::Decode),
            Validation::Failure(errors) => Ok(Validation::Failure(errors)),
        }
    }

    /// Runs a pass and keeps only the errors.
    pub fn errors(&self, values: &Value) -> Option<FieldErrors> {
        match self.schema.validate(values, &FieldPath::root()) {
            Validation::Success(_) => None,
            Validation::Failure(errors) => Some(errors),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.schema.field_names().collect::<Vec<_>>())
            .finish()
    }
}
