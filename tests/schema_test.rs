//! Integration tests for composing schemas into typed validators.

use serde::Deserialize;
use serde_json::json;
use stillwater::Validation;
use serde_json::Value;
use userform::{
    ErrorMap, FieldPath, FormError, PrettyJsonSink, Schema, SchemaLike, SubmissionSink, Validator,
};

fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
    v.into_result().unwrap()
}

fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Team {
    name: String,
    size: i64,
    members: Vec<Member>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Member {
    handle: String,
}

fn team_validator() -> Validator<Team> {
    Validator::new(
        Schema::object()
            .field("name", Schema::string().non_empty().error("Team name is required."))
            .field("size", Schema::integer().coerce().positive())
            .field(
                "members",
                Schema::array(
                    Schema::object().field("handle", Schema::string().min_len(2).max_len(8)),
                )
                .min_len(1)
                .max_len(3),
            ),
    )
}

#[test]
fn test_nested_values_decode() {
    let team = unwrap_success(
        team_validator()
            .validate(&json!({"name": "core", "size": "2", "members": [{"handle": "ana"}]}))
            .unwrap(),
    );
    assert_eq!(
        team,
        Team {
            name: "core".to_string(),
            size: 2,
            members: vec![Member {
                handle: "ana".to_string()
            }],
        }
    );
}

#[test]
fn test_errors_accumulate_across_fields() {
    let errors = unwrap_failure(
        team_validator()
            .validate(&json!({
                "name": "",
                "size": -1,
                "members": [{"handle": "a"}, {"handle": "ok"}, {"handle": "waytoolongname"}]
            }))
            .unwrap(),
    );
    let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(
        paths,
        vec!["name", "size", "members.0.handle", "members.2.handle"]
    );
    assert_eq!(errors.with_code("min_length").len(), 1);
    assert_eq!(errors.with_code("max_length").len(), 1);
}

#[test]
fn test_group_and_entry_errors_together() {
    let errors = unwrap_failure(
        team_validator()
            .validate(&json!({
                "name": "core",
                "size": 1,
                "members": [{"handle": "aa"}, {"handle": "bb"}, {"handle": "cc"}, {"handle": ""}]
            }))
            .unwrap(),
    );
    let map = ErrorMap::from(errors);
    assert!(map.contains(&FieldPath::from_field("members")));
    assert!(map.message("members.3.handle").is_some());
    assert_eq!(map.under(&FieldPath::from_field("members")).count(), 2);
}

#[test]
fn test_untyped_output_keeps_field_order() {
    let validator: Validator<Value> = Validator::new(
        Schema::object()
            .field("zone", Schema::string())
            .field("amount", Schema::integer().coerce()),
    );
    let values = unwrap_success(
        validator
            .validate(&json!({"amount": "5", "zone": "eu"}))
            .unwrap(),
    );

    let mut sink = PrettyJsonSink::new();
    sink.accept(&values);
    assert_eq!(sink.output(), "{\n  \"zone\": \"eu\",\n  \"amount\": 5\n}");
}

#[test]
fn test_decode_mismatch_is_an_error() {
    #[derive(Debug, Deserialize)]
    struct Strict {
        #[allow(dead_code)]
        flag: bool,
    }

    let validator: Validator<Strict> =
        Validator::new(Schema::object().field("flag", Schema::string()));
    let err = validator.validate(&json!({"flag": "yes"})).unwrap_err();
    assert!(matches!(err, FormError::Decode(_)));
}

#[test]
fn test_denied_unknown_fields() {
    let schema = Schema::object()
        .field("name", Schema::string())
        .deny_unknown();
    let errors = unwrap_failure(schema.validate(&json!({"name": "x", "extra": 1}), &FieldPath::root()));
    assert_eq!(errors.first().path.to_string(), "extra");
    assert_eq!(errors.first().code, "additional_property");
}

#[test]
fn test_optional_field_still_checked_when_present() {
    let schema = Schema::object().optional("nickname", Schema::string().min_len(2));
    assert!(SchemaLike::validate(&schema, &json!({}), &FieldPath::root()).is_success());
    assert!(SchemaLike::validate(&schema, &json!({"nickname": null}), &FieldPath::root()).is_success());

    let errors = unwrap_failure(SchemaLike::validate(
        &schema,
        &json!({"nickname": "a"}),
        &FieldPath::root(),
    ));
    assert_eq!(errors.first().path.to_string(), "nickname");
}

#[test]
fn test_custom_pattern_errors() {
    assert!(matches!(
        Schema::string().pattern("(unclosed"),
        Err(regex::Error::Syntax(_))
    ));
}
