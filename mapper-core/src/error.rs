//! Error types for grid construction, field storage and mapping.

use thiserror::Error;

use crate::field::ElementKind;

/// Result alias used throughout the crate.
pub type MapperResult<T> = Result<T, MapperError>;

/// Everything that can go wrong before a mapping writes its output.
///
/// All variants are raised before any destination field is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    /// The requested source field is not present at the given element kind.
    #[error("field '{name}' does not exist at {kind}")]
    MissingField { kind: ElementKind, name: String },

    /// A field's length disagrees with the element count of its kind.
    #[error("field '{name}' at {kind} has {actual} values, expected {expected}")]
    LengthMismatch {
        kind: ElementKind,
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Grid dimensions or connectivity cannot support the operation.
    #[error("invalid topology: {details}")]
    InvalidTopology { details: String },
}

impl MapperError {
    pub(crate) fn missing(kind: ElementKind, name: &str) -> Self {
        MapperError::MissingField {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn topology(details: impl Into<String>) -> Self {
        MapperError::InvalidTopology {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = MapperError::missing(ElementKind::Node, "elevation");
        assert_eq!(err.to_string(), "field 'elevation' does not exist at node");

        let err = MapperError::LengthMismatch {
            kind: ElementKind::Link,
            name: "flux".into(),
            expected: 31,
            actual: 29,
        };
        assert_eq!(
            err.to_string(),
            "field 'flux' at link has 29 values, expected 31"
        );
    }
}
