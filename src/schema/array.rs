//! Array schema validation.
//!
//! [`ArraySchema`] validates list fields. Length rules report at the list's
//! own path (the group), while each item is validated by the item schema at
//! `list.<index>`.

use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;

use super::traits::SchemaLike;
use super::value_type_name;

#[derive(Clone, Debug)]
enum ArrayRule {
    MinLength { min: usize, message: Option<String> },
    MaxLength { max: usize, message: Option<String> },
}

/// A schema for list fields.
///
/// # Example
///
/// ```rust
/// use userform::{FieldPath, Schema};
/// use serde_json::json;
///
/// let tags = Schema::array(Schema::string().non_empty())
///     .non_empty()
///     .error("add at least one tag");
///
/// let errors = tags
///     .validate(&json!([]), &FieldPath::from_field("tags"))
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "tags");
/// assert_eq!(errors.first().message, "add at least one tag");
/// ```
#[derive(Clone, Debug)]
pub struct ArraySchema<S> {
    item_schema: S,
    rules: Vec<ArrayRule>,
    type_error_message: Option<String>,
}

impl<S: SchemaLike> ArraySchema<S> {
    pub fn new(item_schema: S) -> Self {
        Self {
            item_schema,
            rules: Vec::new(),
            type_error_message: None,
        }
    }

    /// The list must hold at least `min` entries.
    pub fn min_len(mut self, min: usize) -> Self {
        self.rules.push(ArrayRule::MinLength { min, message: None });
        self
    }

    /// The list must hold at most `max` entries.
    pub fn max_len(mut self, max: usize) -> Self {
        self.rules.push(ArrayRule::MaxLength { max, message: None });
        self
    }

    /// Equivalent to `.min_len(1)`.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Sets the message of the most recently added rule, or the type error
    /// message when no rule has been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.rules.last_mut() {
            Some(ArrayRule::MinLength { message: m, .. } | ArrayRule::MaxLength { message: m, .. }) => {
                *m = Some(message.into())
            }
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Validates the list.
    ///
    /// The first failing length rule is reported at the group path. Every
    /// item is validated independently and all item errors are kept, so one
    /// pass reports problems in every entry.
    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Vec<Value>, FieldErrors> {
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "expected array".to_string());
                return Validation::Failure(FieldErrors::single(
                    FieldError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(value_type_name(value))
                        .with_expected("array"),
                ));
            }
        };

        let mut errors: Option<FieldErrors> = self
            .rules
            .iter()
            .find_map(|rule| check_rule(rule, items.len(), path))
            .map(FieldErrors::single);

        let mut validated = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.item_schema.validate_to_value(item, &path.push_index(index)) {
                Validation::Success(v) => validated.push(v),
                Validation::Failure(e) => {
                    errors = Some(match errors {
                        Some(acc) => acc.combine(e),
                        None => e,
                    });
                }
            }
        }

        match errors {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(validated),
        }
    }
}

impl<S: SchemaLike> SchemaLike for ArraySchema<S> {
    type Output = Vec<Value>;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Vec<Value>, FieldErrors> {
        ArraySchema::validate(self, value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        ArraySchema::validate(self, value, path).map(Value::Array)
    }

    fn missing_message(&self) -> Option<String> {
        self.rules.iter().find_map(|rule| match rule {
            ArrayRule::MinLength { min, message } if *min > 0 => message.clone(),
            _ => None,
        })
    }
}

fn check_rule(rule: &ArrayRule, len: usize, path: &FieldPath) -> Option<FieldError> {
    match rule {
        ArrayRule::MinLength { min, message } => (len < *min).then(|| {
            FieldError::new(
                path.clone(),
                message
                    .clone()
                    .unwrap_or_else(|| format!("array must have at least {} items, got {}", min, len)),
            )
            .with_code("min_length")
            .with_expected(format!("at least {} items", min))
            .with_got(format!("{} items", len))
        }),
        ArrayRule::MaxLength { max, message } => (len > *max).then(|| {
            FieldError::new(
                path.clone(),
                message
                    .clone()
                    .unwrap_or_else(|| format!("array must have at most {} items, got {}", max, len)),
            )
            .with_code("max_length")
            .with_expected(format!("at most {} items", max))
            .with_got(format!("{} items", len))
        }),
    }
}
