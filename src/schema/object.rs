//! Object schema validation.
//!
//! [`ObjectSchema`] validates a record field by field. Every field is
//! evaluated on every pass and their errors are combined, so a single pass
//! reports the state of the whole form.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;

use super::traits::SchemaLike;
use super::value_type_name;

struct FieldDef {
    schema: Box<dyn SchemaLike<Output = Value>>,
    required: bool,
}

/// How keys without a field definition are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum UnknownFields {
    /// Dropped from the normalized output.
    #[default]
    Strip,
    /// Reported as errors.
    Deny,
}

/// A schema for records.
///
/// # Example
///
/// ```rust
/// use userform::{FieldPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().non_empty().error("Name is required."))
///     .optional("nickname", Schema::string());
///
/// let errors = schema
///     .validate(&json!({}), &FieldPath::root())
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "name");
/// assert_eq!(errors.first().message, "Name is required.");
/// ```
#[derive(Default)]
pub struct ObjectSchema {
    fields: IndexMap<String, FieldDef>,
    unknown_fields: UnknownFields,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required field.
    ///
    /// An absent field is reported with the field schema's own missing
    /// message (see [`SchemaLike::missing_message`]), or a generic one.
    pub fn field<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(SchemaWrapper(schema)),
                required: true,
            },
        );
        self
    }

    /// Adds an optional field. Absent or `null` values are left out of the
    /// normalized output.
    pub fn optional<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(SchemaWrapper(schema)),
                required: false,
            },
        );
        self
    }

    /// Reports keys that have no field definition instead of stripping them.
    pub fn deny_unknown(mut self) -> Self {
        self.unknown_fields = UnknownFields::Deny;
        self
    }

    /// Sets the message used when the value is not an object.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Field names in definition order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn validate(
        &self,
        value: &Value,
        path: &FieldPath,
    ) -> Validation<Map<String, Value>, FieldErrors> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "expected object".to_string());
                return Validation::Failure(FieldErrors::single(
                    FieldError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(value_type_name(value))
                        .with_expected("object"),
                ));
            }
        };

        let mut errors: Vec<FieldErrors> = Vec::new();
        let mut validated = Map::new();

        for (name, field_def) in &self.fields {
            let field_path = path.push_field(name);

            match obj.get(name) {
                Some(Value::Null) | None if !field_def.required => {}
                Some(field_value) => {
                    match field_def.schema.validate_to_value(field_value, &field_path) {
                        Validation::Success(v) => {
                            validated.insert(name.clone(), v);
                        }
                        Validation::Failure(e) => errors.push(e),
                    }
                }
                None => {
                    let message = field_def
                        .schema
                        .missing_message()
                        .unwrap_or_else(|| format!("required field '{}' is missing", name));
                    errors.push(FieldErrors::single(
                        FieldError::new(field_path, message)
                            .with_code("required")
                            .with_expected("value"),
                    ));
                }
            }
        }

        if self.unknown_fields == UnknownFields::Deny {
            for key in obj.keys().filter(|key| !self.fields.contains_key(*key)) {
                errors.push(FieldErrors::single(
                    FieldError::new(path.push_field(key), format!("unknown field '{}'", key))
                        .with_code("additional_property"),
                ));
            }
        }

        match errors.into_iter().reduce(Semigroup::combine) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(validated),
        }
    }
}

impl SchemaLike for ObjectSchema {
    type Output = Map<String, Value>;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Self::Output, FieldErrors> {
        ObjectSchema::validate(self, value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        ObjectSchema::validate(self, value, path).map(Value::Object)
    }
}

/// Adapts any `SchemaLike` to `Value` output so heterogeneous field schemas
/// can share one map.
struct SchemaWrapper<S>(S);

impl<S: SchemaLike> SchemaLike for SchemaWrapper<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.0.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.0.validate_to_value(value, path)
    }

    fn missing_message(&self) -> Option<String> {
        self.0.missing_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArraySchema, IntegerSchema, StringSchema};
    use serde_json::json;

    fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
        v.into_result().unwrap()
    }

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_rejects_non_object() {
        let errors = unwrap_failure(ObjectSchema::new().validate(&json!([1]), &FieldPath::root()));
        assert_eq!(errors.first().code, "invalid_type");
        assert_eq!(errors.first().got.as_deref(), Some("array"));
    }

    #[test]
    fn test_missing_required_uses_field_message() {
        let schema = ObjectSchema::new()
            .field("email", StringSchema::new().non_empty().error("Email is required."))
            .field("age", IntegerSchema::new());

        let errors = unwrap_failure(schema.validate(&json!({}), &FieldPath::root()));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().message, "Email is required.");
        assert_eq!(errors.first().code, "required");
        let age = errors.at_path(&FieldPath::from_field("age")).unwrap();
        assert_eq!(age.message, "required field 'age' is missing");
    }

    #[test]
    fn test_all_fields_evaluated() {
        let schema = ObjectSchema::new()
            .field("a", StringSchema::new().non_empty())
            .field("b", StringSchema::new().non_empty())
            .field("c", StringSchema::new().non_empty());

        let errors = unwrap_failure(schema.validate(&json!({"a": "", "b": "ok", "c": ""}), &FieldPath::root()));
        let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["a", "c"]);
    }

    #[test]
    fn test_optional_absent_or_null_is_skipped() {
        let schema = ObjectSchema::new().optional("dateOfBirth", StringSchema::new());

        let out = unwrap_success(schema.validate(&json!({}), &FieldPath::root()));
        assert!(out.is_empty());
        let out = unwrap_success(schema.validate(&json!({"dateOfBirth": null}), &FieldPath::root()));
        assert!(out.is_empty());
        let out = unwrap_success(schema.validate(&json!({"dateOfBirth": "1990-04-01"}), &FieldPath::root()));
        assert_eq!(out.get("dateOfBirth"), Some(&json!("1990-04-01")));
    }

    #[test]
    fn test_unknown_fields_stripped_by_default() {
        let schema = ObjectSchema::new().field("name", StringSchema::new());
        let out = unwrap_success(schema.validate(&json!({"name": "Ana", "extra": 1}), &FieldPath::root()));
        assert_eq!(Value::Object(out), json!({"name": "Ana"}));
    }

    #[test]
    fn test_deny_unknown() {
        let schema = ObjectSchema::new().field("name", StringSchema::new()).deny_unknown();
        let errors = unwrap_failure(schema.validate(&json!({"name": "Ana", "extra": 1}), &FieldPath::root()));
        assert_eq!(errors.first().code, "additional_property");
        assert_eq!(errors.first().path.to_string(), "extra");
    }

    #[test]
    fn test_output_follows_definition_order() {
        let schema = ObjectSchema::new()
            .field("z", IntegerSchema::new())
            .field("a", IntegerSchema::new());
        let out = unwrap_success(schema.validate(&json!({"a": 1, "z": 2}), &FieldPath::root()));
        let keys: Vec<_> = out.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_nested_list_paths() {
        let schema = ObjectSchema::new().field(
            "jobs",
            ArraySchema::new(ObjectSchema::new().field("title", StringSchema::new().non_empty())),
        );
        let errors = unwrap_failure(schema.validate(
            &json!({"jobs": [{"title": "ok"}, {"title": ""}]}),
            &FieldPath::root(),
        ));
        assert_eq!(errors.first().path.to_string(), "jobs.1.title");
    }
}
