//! String schema validation.
//!
//! [`StringSchema`] holds an ordered list of rules, each paired with an
//! optional custom message. Rules run in the order they were added and the
//! first failing rule decides the field's error.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;

use super::traits::SchemaLike;
use super::value_type_name;

/// Local part and domain shape accepted by [`StringSchema::email`].
const EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$";

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
enum StringRule {
    NonEmpty {
        message: Option<String>,
    },
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    Email {
        regex: Regex,
        message: Option<String>,
    },
    OneOf {
        allowed: Vec<String>,
        message: Option<String>,
    },
    Refine {
        predicate: Predicate,
        message: Option<String>,
    },
}

impl StringRule {
    fn message_mut(&mut self) -> &mut Option<String> {
        match self {
            StringRule::NonEmpty { message }
            | StringRule::MinLength { message, .. }
            | StringRule::MaxLength { message, .. }
            | StringRule::Pattern { message, .. }
            | StringRule::Email { message, .. }
            | StringRule::OneOf { message, .. }
            | StringRule::Refine { message, .. } => message,
        }
    }
}

/// A schema for string fields.
///
/// # Example
///
/// ```rust
/// use userform::{FieldPath, Schema};
/// use serde_json::json;
///
/// let password = Schema::string()
///     .non_empty()
///     .error("Password is required.")
///     .min_len(8)
///     .error("Password must be at least 8 characters long.")
///     .max_len(20)
///     .error("Password must be at most 20 characters long.");
///
/// let errors = password
///     .validate(&json!(""), &FieldPath::from_field("password"))
///     .into_result()
///     .unwrap_err();
/// // Only the first failing rule is reported.
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().message, "Password is required.");
/// ```
#[derive(Clone, Default)]
pub struct StringSchema {
    rules: Vec<StringRule>,
    type_error_message: Option<String>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the empty string.
    pub fn non_empty(mut self) -> Self {
        self.rules.push(StringRule::NonEmpty { message: None });
        self
    }

    /// Requires at least `min` characters (Unicode scalar values).
    pub fn min_len(mut self, min: usize) -> Self {
        self.rules.push(StringRule::MinLength { min, message: None });
        self
    }

    /// Requires at most `max` characters (Unicode scalar values).
    pub fn max_len(mut self, max: usize) -> Self {
        self.rules.push(StringRule::MaxLength { max, message: None });
        self
    }

    /// Requires the whole value to match `pattern`.
    ///
    /// A malformed pattern is a schema definition bug and is returned as an
    /// error at construction time.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.rules.push(StringRule::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Requires a syntactically valid email address.
    ///
    /// Rejects a leading dot and consecutive dots in addition to the shape
    /// check.
    pub fn email(mut self) -> Result<Self, regex::Error> {
        let regex = Regex::new(EMAIL_PATTERN)?;
        self.rules.push(StringRule::Email {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Requires the value to be one of `allowed`.
    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(StringRule::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            message: None,
        });
        self
    }

    /// Adds a custom predicate rule.
    pub fn refine<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(StringRule::Refine {
            predicate: Arc::new(predicate),
            message: None,
        });
        self
    }

    /// Sets the message of the most recently added rule.
    ///
    /// With no rules yet, sets the message used when the value is not a
    /// string at all.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.rules.last_mut() {
            Some(rule) => *rule.message_mut() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<String, FieldErrors> {
        let s = match value.as_str() {
            Some(s) => s,
            None => {
                let message = self
                    .type_error_message
                    .clone()
                    .or_else(|| self.missing_message())
                    .unwrap_or_else(|| "expected string".to_string());
                return Validation::Failure(FieldErrors::single(
                    FieldError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(value_type_name(value))
                        .with_expected("string"),
                ));
            }
        };

        match self.rules.iter().find_map(|rule| check_rule(rule, s, path)) {
            Some(error) => Validation::Failure(FieldErrors::single(error)),
            None => Validation::Success(s.to_string()),
        }
    }

    /// Message of the first `non_empty` rule, used when the field is absent.
    pub fn missing_message(&self) -> Option<String> {
        self.rules.iter().find_map(|rule| match rule {
            StringRule::NonEmpty { message } => Some(
                message
                    .clone()
                    .unwrap_or_else(|| "must not be empty".to_string()),
            ),
            _ => None,
        })
    }
}

impl fmt::Debug for StringSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringSchema")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl SchemaLike for StringSchema {
    type Output = String;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<String, FieldErrors> {
        StringSchema::validate(self, value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        StringSchema::validate(self, value, path).map(Value::String)
    }

    fn missing_message(&self) -> Option<String> {
        StringSchema::missing_message(self)
    }
}

fn check_rule(rule: &StringRule, value: &str, path: &FieldPath) -> Option<FieldError> {
    match rule {
        StringRule::NonEmpty { message } => value.is_empty().then(|| {
            FieldError::new(
                path.clone(),
                message
                    .clone()
                    .unwrap_or_else(|| "must not be empty".to_string()),
            )
            .with_code("required")
            .with_expected("non-empty string")
        }),
        StringRule::MinLength { min, message } => {
            let len = value.chars().count();
            (len < *min).then(|| {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("length must be at least {}, got {}", min, len));
                FieldError::new(path.clone(), msg)
                    .with_code("min_length")
                    .with_expected(format!("at least {} characters", min))
                    .with_got(format!("{} characters", len))
            })
        }
        StringRule::MaxLength { max, message } => {
            let len = value.chars().count();
            (len > *max).then(|| {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("length must be at most {}, got {}", max, len));
                FieldError::new(path.clone(), msg)
                    .with_code("max_length")
                    .with_expected(format!("at most {} characters", max))
                    .with_got(format!("{} characters", len))
            })
        }
        StringRule::Pattern { regex, message } => (!regex.is_match(value)).then(|| {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must match pattern '{}'", regex.as_str()));
            FieldError::new(path.clone(), msg)
                .with_code("pattern")
                .with_expected(format!("string matching '{}'", regex.as_str()))
        }),
        StringRule::Email { regex, message } => {
            let valid = regex.is_match(value) && !value.starts_with('.') && !value.contains("..");
            (!valid).then(|| {
                FieldError::new(
                    path.clone(),
                    message
                        .clone()
                        .unwrap_or_else(|| "invalid email address".to_string()),
                )
                .with_code("email")
                .with_expected("email address")
                .with_got(value.to_string())
            })
        }
        StringRule::OneOf { allowed, message } => {
            (!allowed.iter().any(|a| a == value)).then(|| {
                FieldError::new(
                    path.clone(),
                    message
                        .clone()
                        .unwrap_or_else(|| format!("must be one of: {}", allowed.join(", "))),
                )
                .with_code("one_of")
                .with_expected(allowed.join(" | "))
                .with_got(value.to_string())
            })
        }
        StringRule::Refine { predicate, message } => (!predicate(value)).then(|| {
            FieldError::new(
                path.clone(),
                message.clone().unwrap_or_else(|| "invalid value".to_string()),
            )
            .with_code("custom")
        }),
    }
}
