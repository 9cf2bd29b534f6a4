//! Path-addressed reads and writes on the value tree.

use serde_json::{Map, Value};

use crate::error::FormError;
use crate::path::{FieldPath, PathSegment};

pub(crate) fn read_at<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments().try_fold(root, |current, segment| match segment {
        PathSegment::Field(name) => current.as_object()?.get(name),
        PathSegment::Index(index) => current.as_array()?.get(*index),
    })
}

pub(crate) fn read_at_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Field(name) => current.as_object_mut()?.get_mut(name)?,
            PathSegment::Index(index) => current.as_array_mut()?.get_mut(*index)?,
        };
    }
    Some(current)
}

/// Stores `value` at `path`.
///
/// Missing object keys (and `null` placeholders on the way) become objects;
/// list entries are never created, so indexing past the end of a list fails.
pub(crate) fn write_at(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), FormError> {
    let mut current = root;
    let mut walked = FieldPath::root();

    for segment in path.segments() {
        if current.is_null() && matches!(segment, PathSegment::Field(_)) {
            *current = Value::Object(Map::new());
        }

        current = match (segment, current) {
            (PathSegment::Field(name), Value::Object(map)) => {
                walked = walked.push_field(name);
                map.entry(name.clone()).or_insert(Value::Null)
            }
            (PathSegment::Index(index), Value::Array(items)) => {
                let len = items.len();
                match items.get_mut(*index) {
                    Some(item) => {
                        walked = walked.push_index(*index);
                        item
                    }
                    None => {
                        return Err(FormError::IndexOutOfBounds {
                            path: walked,
                            index: *index,
                            len,
                        })
                    }
                }
            }
            _ => return Err(FormError::NotAContainer { path: walked }),
        };
    }

    *current = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_read_nested() {
        let values = json!({"workExperiences": [{"title": "Engineer"}]});
        assert_eq!(
            read_at(&values, &path("workExperiences.0.title")),
            Some(&json!("Engineer"))
        );
        assert_eq!(read_at(&values, &path("workExperiences.1.title")), None);
        assert_eq!(read_at(&values, &path("name")), None);
        assert_eq!(read_at(&values, &FieldPath::root()), Some(&values));
    }

    #[test]
    fn test_write_creates_object_keys() {
        let mut values = json!({});
        write_at(&mut values, &path("name"), json!("Ana")).unwrap();
        write_at(&mut values, &path("address.city"), json!("Lyon")).unwrap();
        assert_eq!(values, json!({"name": "Ana", "address": {"city": "Lyon"}}));
    }

    #[test]
    fn test_write_into_list_entry() {
        let mut values = json!({"workExperiences": [{"title": ""}]});
        write_at(&mut values, &path("workExperiences.0.duration"), json!("12")).unwrap();
        assert_eq!(values["workExperiences"][0]["duration"], json!("12"));
    }

    #[test]
    fn test_write_past_end_of_list_fails() {
        let mut values = json!({"workExperiences": []});
        let err = write_at(&mut values, &path("workExperiences.0.title"), json!("x")).unwrap_err();
        match err {
            FormError::IndexOutOfBounds { path, index, len } => {
                assert_eq!(path.to_string(), "workExperiences");
                assert_eq!((index, len), (0, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_through_scalar_fails() {
        let mut values = json!({"name": "Ana"});
        let err = write_at(&mut values, &path("name.first"), json!("x")).unwrap_err();
        assert!(matches!(err, FormError::NotAContainer { path } if path.to_string() == "name"));
    }

    #[test]
    fn test_read_at_mut() {
        let mut values = json!({"list": [1, 2]});
        if let Some(Value::Array(items)) = read_at_mut(&mut values, &path("list")) {
            items.push(json!(3));
        }
        assert_eq!(values, json!({"list": [1, 2, 3]}));
        assert!(read_at_mut(&mut values, &path("missing")).is_none());
    }
}
