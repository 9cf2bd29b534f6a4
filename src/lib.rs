//! # userform
//!
//! Validated form state for a "create user" form: declarative field
//! schemas, whole-form validation on every change or on submit, dynamic
//! lists with stable entry identity, and a submission sink.
//!
//! ## Core Types
//!
//! - [`FieldPath`]: dot/index path to a value (e.g. `workExperiences.0.title`)
//! - [`Schema`]: entry point for building field schemas
//! - [`Validator`]: runs an object schema and decodes the result into a type
//! - [`FormState`]: values, published errors, `is_valid`, lists and observers
//! - [`CreateUserForm`]: the concrete create-user form
//!
//! ## Example
//!
//! ```rust
//! use userform::{CreateUserForm, FormConfig};
//!
//! let mut form = CreateUserForm::new(FormConfig::on_change()).unwrap();
//! form.set_field("password", "short").unwrap();
//!
//! let snapshot = form.snapshot();
//! assert_eq!(
//!     snapshot.error("password"),
//!     Some("Password must be at least 8 characters long.")
//! );
//! assert_eq!(
//!     snapshot.error("workExperiences"),
//!     Some("Please add at least one work experience.")
//! );
//! ```

pub mod create_user;
pub mod error;
pub mod form;
pub mod path;
pub mod schema;
pub mod sink;
pub mod validator;

pub use create_user::{CreateUser, CreateUserForm, WorkExperience};
pub use error::{ErrorMap, FieldError, FieldErrors, FormError};
pub use form::{
    EntryId, FieldArray, FormConfig, FormSnapshot, FormState, SubmitOutcome, SubscriptionId,
    ValidationMode,
};
pub use path::{FieldPath, PathError, PathSegment};
pub use schema::{ArraySchema, IntegerSchema, ObjectSchema, Schema, SchemaLike, StringSchema};
pub use sink::{PrettyJsonSink, SubmissionSink};
pub use validator::Validator;

/// Type alias for validation results using FieldErrors
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;
