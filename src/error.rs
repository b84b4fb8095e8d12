//! Build-time and encode-time error types
//!
//! Errors fall into two disjoint classes. [`SchemaError`] and the
//! [`ConstraintError`] it wraps are raised once, while a record schema is
//! being built and its constraints compiled; they never occur at runtime.
//! Runtime failures are either [`DecodeError`](crate::parse::DecodeError)
//! or, for the dynamic interpreter only, [`EncodeError`].

use thiserror::Error;

use crate::schema::typeref::UnsupportedShape;

/// Errors raised while parsing or compiling a field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("unknown constraint '{0}'")]
    UnknownConstraint(String),

    #[error("constraint '{0}' requires an argument")]
    MissingArgument(String),

    #[error("constraint '{0}' does not take an argument")]
    UnexpectedArgument(String),

    #[error("constraint '{name}' cannot be applied to a field of type {ty}")]
    Incompatible { name: String, ty: String },

    #[error("constraint '{name}': '{literal}' is not a valid {kind} value")]
    InvalidLiteral {
        name: String,
        literal: String,
        kind: String,
    },

    #[error("constraint '{name}': '{literal}' is not a valid length")]
    InvalidLength { name: String, literal: String },
}

/// Errors raised while turning an external type graph into a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type {0} contains itself")]
    CyclicType(String),

    #[error("unsupported type shape: {0}")]
    UnsupportedType(UnsupportedShape),

    #[error("unknown type {0}")]
    UnknownType(String),

    #[error("type {0} is not a record")]
    NotARecord(String),

    #[error("map key type {0} is not a scalar")]
    InvalidMapKey(String),

    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    #[error("field '{field}': {source}")]
    Constraint {
        field: String,
        source: ConstraintError,
    },

    #[error("field '{field}': {source}")]
    Field {
        field: String,
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Strips every [`SchemaError::Field`] wrapper and returns the innermost error.
    #[must_use]
    pub fn root_cause(&self) -> &SchemaError {
        let mut err = self;
        while let SchemaError::Field { source, .. } = err {
            err = source;
        }
        err
    }

    /// Field names leading from the outermost record down to the failure.
    #[must_use]
    pub fn field_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut err = self;
        loop {
            match err {
                SchemaError::Field { field, source } => {
                    path.push(field.as_str());
                    err = source;
                }
                SchemaError::Constraint { field, .. } => {
                    path.push(field.as_str());
                    return path;
                }
                _ => return path,
            }
        }
    }

    pub(crate) fn in_field(self, field: &str) -> Self {
        SchemaError::Field {
            field: field.to_owned(),
            source: Box::new(self),
        }
    }
}

/// Errors raised by the dynamic encoder when a value does not fit its schema.
///
/// Values produced by generated code cannot trigger these; they only
/// arise from hand-built [`Value`](crate::codec::Value) trees.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("expected a {expected} value, found {found}")]
    Mismatch {
        expected: String,
        found: &'static str,
    },

    #[error("fixed array expects {expected} elements, found {found}")]
    ArrayLength { expected: usize, found: usize },

    #[error("record value is missing field '{0}'")]
    MissingField(String),

    #[error("byte sink failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_fields() {
        let err = SchemaError::CyclicType(String::from("Node"))
            .in_field("next")
            .in_field("head");
        assert_eq!(err.root_cause(), &SchemaError::CyclicType(String::from("Node")));
        assert_eq!(err.field_path(), ["head", "next"]);
        assert_eq!(err.to_string(), "field 'head': field 'next': type Node contains itself");
    }

    #[test]
    fn constraint_path() {
        let err = SchemaError::Constraint {
            field: String::from("Age"),
            source: ConstraintError::UnknownConstraint(String::from("positive")),
        }
        .in_field("Person");
        assert_eq!(err.field_path(), ["Person", "Age"]);
        assert!(err.to_string().ends_with("unknown constraint 'positive'"));
    }
}
