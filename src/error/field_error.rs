//! Validation error types.
//!
//! [`FieldError`] is one failed rule at one path. [`FieldErrors`] is the
//! non-empty failure side of a validation pass, and [`ErrorMap`] is the
//! possibly-empty path-keyed view that the form state publishes.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::path::FieldPath;

/// A single failed field rule.
///
/// # Example
///
/// ```rust
/// use userform::{FieldError, FieldPath};
///
/// let error = FieldError::new(FieldPath::from_field("email"), "Invalid email format.")
///     .with_code("email")
///     .with_got("not-an-email");
///
/// assert_eq!(error.to_string(), "email: Invalid email format. (got: not-an-email)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The path of the offending value.
    pub path: FieldPath,
    /// Human-readable message shown next to the control.
    pub message: String,
    /// The value that was received, when it is worth echoing.
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable rule code (e.g. `min_length`).
    pub code: String,
}

impl FieldError {
    /// Creates a new error with code `validation_error`.
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {}", path_str, self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// A non-empty collection of field errors.
///
/// Wraps a `NonEmptyVec<FieldError>` so that `Validation<T, FieldErrors>`
/// can never fail with zero errors. Collections from independent fields are
/// joined with [`Semigroup::combine`].
///
/// ```rust
/// use userform::{FieldError, FieldErrors, FieldPath};
/// use stillwater::prelude::*;
///
/// let name = FieldErrors::single(FieldError::new(FieldPath::from_field("name"), "Name is required."));
/// let email = FieldErrors::single(FieldError::new(FieldPath::from_field("email"), "Email is required."));
///
/// assert_eq!(name.combine(email).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Builds a collection from a vec, or `None` if the vec is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the first error recorded at `path`, if any.
    pub fn at_path(&self, path: &FieldPath) -> Option<&FieldError> {
        self.0.iter().find(|e| &e.path == path)
    }

    /// Returns all errors with the given rule code.
    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

/// Path-keyed error set published by the form state.
///
/// Holds at most one error per path; when a pass produces several errors at
/// the same path, the first one is kept. Insertion order follows the order
/// in which the schema evaluates its fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMap {
    entries: IndexMap<FieldPath, FieldError>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldError> {
        self.entries.get(path)
    }

    /// Returns the message at a dot-notation path such as
    /// `workExperiences.0.title`. Unparseable paths have no message.
    pub fn message(&self, path: &str) -> Option<&str> {
        let path = path.parse::<FieldPath>().ok()?;
        self.entries.get(&path).map(|e| e.message.as_str())
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldError)> {
        self.entries.iter()
    }

    /// Returns the errors at `prefix` or below it.
    pub fn under<'a>(&'a self, prefix: &'a FieldPath) -> impl Iterator<Item = &'a FieldError> {
        self.entries
            .iter()
            .filter(move |(path, _)| path.starts_with(prefix))
            .map(|(_, error)| error)
    }

    fn insert_first(&mut self, error: FieldError) {
        self.entries.entry(error.path.clone()).or_insert(error);
    }
}

impl From<FieldErrors> for ErrorMap {
    fn from(errors: FieldErrors) -> Self {
        let mut map = ErrorMap::new();
        for error in errors {
            map.insert_first(error);
        }
        map
    }
}
