//! Field tag parsing
//!
//! A tag is a comma-separated list of entries, each either a bare constraint
//! name, `name=args`, or `-` to skip the field. Entries are trimmed and empty
//! ones ignored, so `"alpha, maxlen=5,"` declares two constraints.

use crate::error::ConstraintError;

use super::registry::{self, Arity};

/// A constraint as written in a tag, before it is bound to a field type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintDecl {
    pub name: String,
    pub args: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldTag {
    pub skip: bool,
    /// Declarations in tag order.
    pub constraints: Vec<ConstraintDecl>,
}

/// Parses a raw field tag.
///
/// Only names and argument presence are validated here; argument values
/// are checked once the field type is known.
pub fn parse_tag(raw: &str) -> Result<FieldTag, ConstraintError> {
    let mut tag = FieldTag::default();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if entry == "-" {
            tag.skip = true;
            continue;
        }
        let (name, args) = match entry.split_once('=') {
            Some((name, args)) => (name.trim(), Some(args.trim())),
            None => (entry, None),
        };
        let spec = registry::lookup(name)
            .ok_or_else(|| ConstraintError::UnknownConstraint(name.to_owned()))?;
        let args = match (spec.arity, args) {
            (Arity::Required, None) | (Arity::Required, Some("")) => {
                return Err(ConstraintError::MissingArgument(name.to_owned()))
            }
            (Arity::Required, Some(args)) => Some(args.to_owned()),
            (Arity::None, None) => None,
            (Arity::None, Some(_)) => {
                return Err(ConstraintError::UnexpectedArgument(name.to_owned()))
            }
        };
        tag.constraints.push(ConstraintDecl {
            name: name.to_owned(),
            args,
        });
    }
    Ok(tag)
}
