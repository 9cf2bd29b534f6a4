//! Field schemas.
//!
//! Each field maps to an ordered list of rules paired with messages. Within
//! one field the first failing rule wins; across fields every schema is
//! evaluated on every pass.
//!
//! # Example
//!
//! ```rust
//! use userform::{FieldPath, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::object()
//!     .field("email", Schema::string().non_empty().error("Email is required.").email().unwrap())
//!     .field(
//!         "jobs",
//!         Schema::array(Schema::object().field("months", Schema::integer().coerce().min(1)))
//!             .non_empty(),
//!     );
//!
//! let result = schema.validate(
//!     &json!({"email": "ana@example.com", "jobs": [{"months": "3"}]}),
//!     &FieldPath::root(),
//! );
//! assert!(result.is_success());
//! ```

mod array;
mod numeric;
mod object;
mod string;
mod traits;

use serde_json::Value;

pub use array::ArraySchema;
pub use numeric::IntegerSchema;
pub use object::ObjectSchema;
pub use string::StringSchema;
pub use traits::SchemaLike;

/// Entry point for building schemas.
pub struct Schema;

impl Schema {
    /// A string field with no rules.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// An integer field with no rules.
    pub fn integer() -> IntegerSchema {
        IntegerSchema::new()
    }

    /// A list field whose entries are validated by `item`.
    pub fn array<S: SchemaLike>(item: S) -> ArraySchema<S> {
        ArraySchema::new(item)
    }

    /// A record with no fields.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
