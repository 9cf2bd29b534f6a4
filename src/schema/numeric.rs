//! Integer schema validation.
//!
//! [`IntegerSchema`] checks integer values against ordered bound rules. With
//! [`IntegerSchema::coerce`] it also accepts the text a user typed into a
//! number input and converts it before the rules run.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;

use super::traits::SchemaLike;
use super::value_type_name;

#[derive(Clone, Debug)]
enum IntegerRule {
    Min { value: i64, message: Option<String> },
    Max { value: i64, message: Option<String> },
    Positive { message: Option<String> },
}

/// A schema for integer fields.
///
/// # Example
///
/// ```rust
/// use userform::{FieldPath, Schema};
/// use serde_json::json;
///
/// let duration = Schema::integer()
///     .coerce()
///     .error("Duration must be a whole number of months.")
///     .min(1)
///     .error("Duration must be at least 1 month.");
///
/// let path = FieldPath::from_field("duration");
/// assert_eq!(duration.validate(&json!("12"), &path).into_result().unwrap(), 12);
///
/// let errors = duration.validate(&json!("abc"), &path).into_result().unwrap_err();
/// assert_eq!(errors.first().code, "coercion");
/// ```
#[derive(Clone, Debug, Default)]
pub struct IntegerSchema {
    rules: Vec<IntegerRule>,
    coerce: bool,
    type_error_message: Option<String>,
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts numeric text and integral floats in addition to integers.
    ///
    /// Surrounding whitespace is ignored and blank text coerces to `0`, so it
    /// is reported by the bound rules. Anything else that does not denote a
    /// whole number fails with code `coercion`.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Minimum value (inclusive).
    pub fn min(mut self, value: i64) -> Self {
        self.rules.push(IntegerRule::Min {
            value,
            message: None,
        });
        self
    }

    /// Maximum value (inclusive).
    pub fn max(mut self, value: i64) -> Self {
        self.rules.push(IntegerRule::Max {
            value,
            message: None,
        });
        self
    }

    /// Value must be greater than zero.
    pub fn positive(mut self) -> Self {
        self.rules.push(IntegerRule::Positive { message: None });
        self
    }

    /// Sets the message of the most recently added rule.
    ///
    /// With no rules yet, sets the message for values that are not (and
    /// cannot be coerced to) an integer.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.rules.last_mut() {
            Some(
                IntegerRule::Min { message: m, .. }
                | IntegerRule::Max { message: m, .. }
                | IntegerRule::Positive { message: m },
            ) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<i64, FieldErrors> {
        let n = match self.read_integer(value) {
            Ok(n) => n,
            Err(error) => {
                return Validation::Failure(FieldErrors::single(self.type_error(error, path)))
            }
        };

        match self.rules.iter().find_map(|rule| check_rule(rule, n, path)) {
            Some(error) => Validation::Failure(FieldErrors::single(error)),
            None => Validation::Success(n),
        }
    }

    fn read_integer(&self, value: &Value) -> Result<i64, ReadError> {
        match value {
            Value::Number(num) => {
                if let Some(n) = num.as_i64() {
                    Ok(n)
                } else if num.is_u64() {
                    Err(ReadError::Overflow {
                        got: num.to_string(),
                        negative: false,
                    })
                } else if self.coerce {
                    let got = num.to_string();
                    match num.as_f64() {
                        Some(f) => whole(f, got),
                        None => Err(ReadError::Coercion(got)),
                    }
                } else {
                    Err(ReadError::Float)
                }
            }
            Value::String(text) if self.coerce => coerce_text(text),
            other => Err(ReadError::Type(value_type_name(other))),
        }
    }

    fn type_error(&self, error: ReadError, path: &FieldPath) -> FieldError {
        let custom = self.type_error_message.clone();
        match error {
            ReadError::Type(got) => FieldError::new(
                path.clone(),
                custom.unwrap_or_else(|| "expected integer".to_string()),
            )
            .with_code("invalid_type")
            .with_got(got)
            .with_expected("integer"),
            ReadError::Float => FieldError::new(
                path.clone(),
                custom.unwrap_or_else(|| "expected integer, got float".to_string()),
            )
            .with_code("invalid_type")
            .with_got("float")
            .with_expected("integer"),
            ReadError::Overflow { got, negative } => FieldError::new(
                path.clone(),
                self.bound_message(negative)
                    .unwrap_or_else(|| "integer value out of range".to_string()),
            )
            .with_code("overflow")
            .with_got(got)
            .with_expected("integer in i64 range"),
            ReadError::Coercion(got) => FieldError::new(
                path.clone(),
                custom.unwrap_or_else(|| format!("'{}' is not a whole number", got)),
            )
            .with_code("coercion")
            .with_got(got)
            .with_expected("whole number"),
        }
    }
}

impl IntegerSchema {
    /// Message of the first bound an out-of-range value breaks: a lower
    /// bound when `negative`, an upper bound otherwise.
    fn bound_message(&self, negative: bool) -> Option<String> {
        self.rules.iter().find_map(|rule| match rule {
            IntegerRule::Max { message, .. } if !negative => message.clone(),
            IntegerRule::Min { message, .. } | IntegerRule::Positive { message } if negative => {
                message.clone()
            }
            _ => None,
        })
    }
}

impl SchemaLike for IntegerSchema {
    type Output = i64;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<i64, FieldErrors> {
        IntegerSchema::validate(self, value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        IntegerSchema::validate(self, value, path).map(Value::from)
    }
}

enum ReadError {
    Type(&'static str),
    Float,
    Overflow { got: String, negative: bool },
    Coercion(String),
}

fn coerce_text(text: &str) -> Result<i64, ReadError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) => whole(f, text.to_string()),
        Err(_) => Err(ReadError::Coercion(text.to_string())),
    }
}

/// Converts a float to i64 when it is finite and whole.
///
/// Whole numbers beyond the i64 range are overflow, not coercion failures.
fn whole(f: f64, got: String) -> Result<i64, ReadError> {
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(ReadError::Coercion(got));
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(ReadError::Overflow {
            got,
            negative: f < 0.0,
        });
    }
    Ok(f as i64)
}

fn check_rule(rule: &IntegerRule, n: i64, path: &FieldPath) -> Option<FieldError> {
    match rule {
        IntegerRule::Min { value, message } => (n < *value).then(|| {
            FieldError::new(
                path.clone(),
                message
                    .clone()
                    .unwrap_or_else(|| format!("value must be at least {}, got {}", value, n)),
            )
            .with_code("min_value")
            .with_expected(format!(">= {}", value))
            .with_got(n.to_string())
        }),
        IntegerRule::Max { value, message } => (n > *value).then(|| {
            FieldError::new(
                path.clone(),
                message
                    .clone()
                    .unwrap_or_else(|| format!("value must be at most {}, got {}", value, n)),
            )
            .with_code("max_value")
            .with_expected(format!("<= {}", value))
            .with_got(n.to_string())
        }),
        IntegerRule::Positive { message } => (n <= 0).then(|| {
            FieldError::new(
                path.clone(),
                message
                    .clone()
                    .unwrap_or_else(|| format!("value must be positive, got {}", n)),
            )
            .with_code("positive")
            .with_expected("> 0")
            .with_got(n.to_string())
        }),
    }
}
