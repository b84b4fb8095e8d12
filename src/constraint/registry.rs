//! Static constraint table
//!
//! Every recognized constraint name maps to its argument arity, the
//! predicate deciding which field types it may be attached to, and the kind
//! of rule it compiles into. The table is immutable; the name index over it
//! is built lazily on first use.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::StringShape;
use crate::schema::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    None,
    Required,
}

/// What a constraint compiles into once its argument is parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    Shape(StringShape),
    Contains,
    StartsWith,
    EndsWith,
    OneOf,
    Eq,
    Neq,
    Min,
    Max,
    MinLen,
    MaxLen,
}

#[derive(Clone, Copy)]
pub struct ConstraintSpec {
    pub name: &'static str,
    pub arity: Arity,
    /// Whether the constraint may be attached to a field of the given type.
    pub applies: fn(&Type) -> bool,
    pub kind: RuleKind,
}

impl std::fmt::Debug for ConstraintSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("kind", &self.kind)
            .finish()
    }
}

const fn shape(name: &'static str, shape: StringShape) -> ConstraintSpec {
    ConstraintSpec {
        name,
        arity: Arity::None,
        applies: is_string,
        kind: RuleKind::Shape(shape),
    }
}

const fn with_arg(name: &'static str, applies: fn(&Type) -> bool, kind: RuleKind) -> ConstraintSpec {
    ConstraintSpec {
        name,
        arity: Arity::Required,
        applies,
        kind,
    }
}

pub static CONSTRAINTS: &[ConstraintSpec] = &[
    shape("alpha", StringShape::Alpha),
    shape("alphanum", StringShape::Alphanumeric),
    shape("numeric", StringShape::Numeric),
    shape("hexadecimal", StringShape::Hexadecimal),
    shape("email", StringShape::Email),
    shape("url", StringShape::Url),
    shape("base64", StringShape::Base64),
    shape("uuid", StringShape::Uuid),
    shape("ip", StringShape::Ip),
    shape("ipv4", StringShape::Ipv4),
    shape("ipv6", StringShape::Ipv6),
    with_arg("contains", is_string, RuleKind::Contains),
    with_arg("startswith", is_string, RuleKind::StartsWith),
    with_arg("endswith", is_string, RuleKind::EndsWith),
    with_arg("oneof", is_scalar, RuleKind::OneOf),
    with_arg("eq", is_scalar, RuleKind::Eq),
    with_arg("neq", is_scalar, RuleKind::Neq),
    with_arg("min", is_numeric, RuleKind::Min),
    with_arg("max", is_numeric, RuleKind::Max),
    with_arg("minlen", is_lengthed, RuleKind::MinLen),
    with_arg("maxlen", is_lengthed, RuleKind::MaxLen),
];

lazy_static! {
    static ref INDEX: HashMap<&'static str, &'static ConstraintSpec> =
        CONSTRAINTS.iter().map(|spec| (spec.name, spec)).collect();
}

/// Looks up a constraint by its tag name.
pub fn lookup(name: &str) -> Option<&'static ConstraintSpec> {
    INDEX.get(name).copied()
}

fn scalar_of(ty: &Type) -> Option<crate::schema::ScalarKind> {
    ty.unwrap_optional().0.scalar_kind()
}

/// `string` or optional `string`.
pub fn is_string(ty: &Type) -> bool {
    scalar_of(ty) == Some(crate::schema::ScalarKind::String)
}

/// Any integer or float kind, optionally wrapped.
pub fn is_numeric(ty: &Type) -> bool {
    scalar_of(ty).map_or(false, |kind| kind.is_numeric())
}

/// Any scalar, optionally wrapped.
pub fn is_scalar(ty: &Type) -> bool {
    scalar_of(ty).is_some()
}

/// Types whose length is known from their prefix alone.
pub fn is_lengthed(ty: &Type) -> bool {
    matches!(
        ty.unwrap_optional().0,
        Type::Sequence { .. } | Type::ByteBuffer { .. }
    ) || is_string(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarKind;

    #[test]
    fn every_name_indexed_once() {
        assert_eq!(INDEX.len(), CONSTRAINTS.len());
        assert_eq!(CONSTRAINTS.len(), 21);
        assert_eq!(lookup("maxlen").map(|s| s.kind), Some(RuleKind::MaxLen));
        assert!(lookup("MaxLen").is_none());
    }

    #[test]
    fn applicability() {
        let string = Type::scalar(ScalarKind::String);
        let opt_u8 = Type::optional(Type::scalar(ScalarKind::Uint8));
        let bytes = Type::optional(Type::byte_buffer());
        let nested = Type::optional(Type::optional(Type::scalar(ScalarKind::String)));

        assert!(is_string(&string));
        assert!(!is_string(&nested));
        assert!(is_numeric(&opt_u8));
        assert!(!is_numeric(&string));
        assert!(is_scalar(&Type::scalar(ScalarKind::Bool)));
        assert!(is_lengthed(&bytes));
        assert!(is_lengthed(&string));
        assert!(!is_lengthed(&Type::fixed_array(2, string.clone())));
        assert!(!is_lengthed(&Type::map(string.clone(), string)));
    }
}
