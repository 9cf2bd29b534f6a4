//! Field paths for locating values in the form's value tree.
//!
//! A [`FieldPath`] is written in dot/index notation: `workExperiences.0.title`
//! names the `title` of the first work experience. Paths are used both to
//! address writes (`set_field`) and to key validation errors.

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// A segment of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field (e.g. `email`)
    Field(String),
    /// A list position (e.g. `0`)
    Index(usize),
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(idx) => Some(*idx),
            PathSegment::Field(_) => None,
        }
    }
}

/// Error returned when a path string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty segment at position {position} in path '{path}'")]
    EmptySegment { path: String, position: usize },
}

/// A path to a value in the form's nested value tree.
///
/// # Example
///
/// ```rust
/// use userform::FieldPath;
///
/// let path = FieldPath::root()
///     .push_field("workExperiences")
///     .push_index(0)
///     .push_field("title");
///
/// assert_eq!(path.to_string(), "workExperiences.0.title");
/// assert_eq!("workExperiences.0.title".parse::<FieldPath>().unwrap(), path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Creates an empty path representing the whole form.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the parent path, or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns true if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Field(name) => write!(f, "{}", name)?,
                PathSegment::Index(idx) => write!(f, "{}", idx)?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    /// Parses dot notation. All-digit segments become indices; an empty
    /// string is the root path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .enumerate()
            .map(|(position, part)| {
                if part.is_empty() {
                    Err(PathError::EmptySegment {
                        path: s.to_string(),
                        position,
                    })
                } else if let Ok(idx) = part.parse::<usize>() {
                    Ok(PathSegment::Index(idx))
                } else {
                    Ok(PathSegment::Field(part.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = FieldPath::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_list_entry_field() {
        let path = FieldPath::root()
            .push_field("workExperiences")
            .push_index(2)
            .push_field("duration");
        assert_eq!(path.to_string(), "workExperiences.2.duration");
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_parse_roundtrips_display() {
        let path: FieldPath = "workExperiences.0.title".parse().unwrap();
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments[0], &PathSegment::field("workExperiences"));
        assert_eq!(segments[1].as_index(), Some(0));
        assert_eq!(segments[0].as_index(), None);
        assert_eq!(segments[2], &PathSegment::field("title"));
        assert_eq!(path.to_string(), "workExperiences.0.title");
    }

    #[test]
    fn test_parse_matches_builders() {
        let parsed: FieldPath = "workExperiences.0".parse().unwrap();
        assert_eq!(parsed, FieldPath::from_field("workExperiences").push_index(0));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        let err = "workExperiences..title".parse::<FieldPath>().unwrap_err();
        assert_eq!(
            err,
            PathError::EmptySegment {
                path: "workExperiences..title".to_string(),
                position: 1
            }
        );
        assert!("name.".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!("".parse::<FieldPath>().unwrap().is_root());
    }

    #[test]
    fn test_path_immutability() {
        let base = FieldPath::from_field("workExperiences");
        let first = base.push_index(0);
        let second = base.push_index(1);

        assert_eq!(base.to_string(), "workExperiences");
        assert_eq!(first.to_string(), "workExperiences.0");
        assert_eq!(second.to_string(), "workExperiences.1");
    }

    #[test]
    fn test_parent_and_last() {
        let path = FieldPath::from_field("workExperiences")
            .push_index(0)
            .push_field("title");

        assert_eq!(path.last(), Some(&PathSegment::field("title")));
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "workExperiences.0");
        assert!(FieldPath::root().parent().is_none());
    }

    #[test]
    fn test_starts_with() {
        let list = FieldPath::from_field("workExperiences");
        let entry = list.push_index(3).push_field("title");
        assert!(entry.starts_with(&list));
        assert!(list.starts_with(&list));
        assert!(!list.starts_with(&entry));
        assert!(!FieldPath::from_field("name").starts_with(&list));
    }
}
