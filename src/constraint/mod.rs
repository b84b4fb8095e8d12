//! Field constraints
//!
//! A [`Constraint`] is a decode-time check bound to one field. Constraints
//! are declared in field tags (see [`tag`]), looked up in the static table
//! in [`registry`], and compiled against the field's resolved [`Type`] by
//! [`compile`]. Every failure in this pipeline is a build-time
//! [`ConstraintError`]; at decode time a compiled constraint can only report
//! a [`DecodeError::ConstraintViolation`].
//!
//! # Phases
//!
//! Length bounds (`minlen`, `maxlen`) run [`Phase::BeforeRead`], against the
//! length prefix, so that an oversized value is rejected before it is
//! materialized. Everything else runs [`Phase::AfterRead`] on the decoded
//! value, in declaration order; the first failure wins.
//!
//! A constraint on an optional field applies to the contained value. An
//! absent value passes every constraint.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use crate::codec::value::{Number, Value};
use crate::error::ConstraintError;
use crate::parse::{DecodeError, DecodeResult};
use crate::schema::{ScalarKind, Type};

pub mod check;
pub mod registry;
pub mod tag;

pub use registry::{lookup, Arity, ConstraintSpec, RuleKind};
pub use tag::{parse_tag, ConstraintDecl, FieldTag};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    BeforeRead,
    AfterRead,
}

/// Value-shape checks on strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum StringShape {
    Alpha,
    Alphanumeric,
    Numeric,
    Hexadecimal,
    Email,
    Url,
    Base64,
    Uuid,
    Ip,
    Ipv4,
    Ipv6,
}

impl StringShape {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StringShape::Alpha => "alpha",
            StringShape::Alphanumeric => "alphanum",
            StringShape::Numeric => "numeric",
            StringShape::Hexadecimal => "hexadecimal",
            StringShape::Email => "email",
            StringShape::Url => "url",
            StringShape::Base64 => "base64",
            StringShape::Uuid => "uuid",
            StringShape::Ip => "ip",
            StringShape::Ipv4 => "ipv4",
            StringShape::Ipv6 => "ipv6",
        }
    }

    /// Regex source for shapes checked by a precompiled pattern.
    #[must_use]
    pub const fn pattern(self) -> Option<&'static str> {
        match self {
            StringShape::Alpha => Some(check::ALPHA_PATTERN),
            StringShape::Alphanumeric => Some(check::ALPHANUMERIC_PATTERN),
            StringShape::Numeric => Some(check::NUMERIC_PATTERN),
            StringShape::Hexadecimal => Some(check::HEXADECIMAL_PATTERN),
            StringShape::Email => Some(check::EMAIL_PATTERN),
            StringShape::Base64 => Some(check::BASE64_PATTERN),
            StringShape::Uuid => Some(check::UUID_PATTERN),
            _ => None,
        }
    }

    #[must_use]
    pub fn matches(self, s: &str) -> bool {
        match self {
            StringShape::Alpha => check::is_alpha(s),
            StringShape::Alphanumeric => check::is_alphanumeric(s),
            StringShape::Numeric => check::is_numeric(s),
            StringShape::Hexadecimal => check::is_hexadecimal(s),
            StringShape::Email => check::is_email(s),
            StringShape::Url => check::is_url(s),
            StringShape::Base64 => check::is_base64(s),
            StringShape::Uuid => check::is_uuid(s),
            StringShape::Ip => check::is_ip(s),
            StringShape::Ipv4 => check::is_ipv4(s),
            StringShape::Ipv6 => check::is_ipv6(s),
        }
    }

    /// Predicate completing the sentence "field 'F' ...".
    #[must_use]
    pub const fn failure(self) -> &'static str {
        match self {
            StringShape::Alpha => "contains non alpha characters",
            StringShape::Alphanumeric => "contains non alphanumeric characters",
            StringShape::Numeric => "contains non numeric characters",
            StringShape::Hexadecimal => "is not a valid hexadecimal string",
            StringShape::Email => "is not a valid email",
            StringShape::Url => "is not a valid URL",
            StringShape::Base64 => "is not a valid base64 string",
            StringShape::Uuid => "is not a valid UUID",
            StringShape::Ip => "is not a valid IP address",
            StringShape::Ipv4 => "is not a valid IPv4",
            StringShape::Ipv6 => "is not a valid IPv6",
        }
    }
}

/// A constraint argument parsed against the field's scalar kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum Literal {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    /// `float32` literals are parsed at single precision and widened.
    Float(f64),
}

impl Literal {
    /// Parses `raw` as a value of exactly `kind`, range included.
    #[must_use]
    pub fn parse(kind: ScalarKind, raw: &str) -> Option<Literal> {
        fn int<T: std::str::FromStr + Into<i64>>(raw: &str) -> Option<Literal> {
            raw.parse::<T>().ok().map(|x| Literal::Int(x.into()))
        }
        fn uint<T: std::str::FromStr + Into<u64>>(raw: &str) -> Option<Literal> {
            raw.parse::<T>().ok().map(|x| Literal::Uint(x.into()))
        }

        match kind {
            ScalarKind::String => Some(Literal::Str(raw.to_owned())),
            ScalarKind::Bool => match raw {
                "true" => Some(Literal::Bool(true)),
                "false" => Some(Literal::Bool(false)),
                _ => None,
            },
            ScalarKind::Int8 => int::<i8>(raw),
            ScalarKind::Int16 => int::<i16>(raw),
            ScalarKind::Int32 => int::<i32>(raw),
            ScalarKind::Int | ScalarKind::Int64 => int::<i64>(raw),
            ScalarKind::Uint8 => uint::<u8>(raw),
            ScalarKind::Uint16 => uint::<u16>(raw),
            ScalarKind::Uint32 => uint::<u32>(raw),
            ScalarKind::Uint | ScalarKind::Uint64 | ScalarKind::Uintptr => uint::<u64>(raw),
            ScalarKind::Float32 => {
                let x = raw.parse::<f32>().ok()?;
                let wide = raw.parse::<f64>().ok()?;
                // overflow to infinity is out of range
                if x.is_infinite() && wide.is_finite() {
                    return None;
                }
                Some(Literal::Float(x.into()))
            }
            ScalarKind::Float64 => raw.parse::<f64>().ok().map(Literal::Float),
        }
    }

    /// Form used inside `oneof` descriptions, where strings are quoted.
    #[must_use]
    pub fn quoted(&self) -> String {
        match self {
            Literal::Str(s) => format!("{s:?}"),
            other => other.to_string(),
        }
    }

    /// Compares a decoded value against this literal. `None` if the two are
    /// of different kinds or unordered.
    #[must_use]
    pub fn compare(&self, value: &Value) -> Option<Ordering> {
        match (value, self) {
            (Value::String(s), Literal::Str(lit)) => Some(s.as_str().cmp(lit.as_str())),
            (Value::Bool(b), Literal::Bool(lit)) => Some(b.cmp(lit)),
            (value, lit) => {
                let lit = match *lit {
                    Literal::Int(x) => Number::Signed(x),
                    Literal::Uint(x) => Number::Unsigned(x),
                    Literal::Float(x) => Number::Float(x),
                    _ => return None,
                };
                value.number()?.compare(lit)
            }
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(x) => write!(f, "{x}"),
            Literal::Uint(x) => write!(f, "{x}"),
            Literal::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum Rule {
    Shape(StringShape),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    OneOf(Vec<Literal>),
    Eq(Literal),
    Neq(Literal),
    Min(Literal),
    Max(Literal),
    MinLen(usize),
    MaxLen(usize),
}

/// A compiled check bound to one field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct Constraint {
    pub field: String,
    pub rule: Rule,
    /// Whether the field is optional, so the check applies to its contents.
    pub optional: bool,
}

impl Constraint {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.rule {
            Rule::MinLen(_) | Rule::MaxLen(_) => Phase::BeforeRead,
            _ => Phase::AfterRead,
        }
    }

    /// Tag name of the constraint.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match &self.rule {
            Rule::Shape(shape) => shape.name(),
            Rule::Contains(_) => "contains",
            Rule::StartsWith(_) => "startswith",
            Rule::EndsWith(_) => "endswith",
            Rule::OneOf(_) => "oneof",
            Rule::Eq(_) => "eq",
            Rule::Neq(_) => "neq",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::MinLen(_) => "minlen",
            Rule::MaxLen(_) => "maxlen",
        }
    }

    /// Message reported when the constraint is violated.
    #[must_use]
    pub fn description(&self) -> String {
        let field = &self.field;
        match &self.rule {
            Rule::Shape(shape) => format!("field '{field}' {}", shape.failure()),
            Rule::Contains(arg) => format!("field '{field}' does not contain '{arg}'"),
            Rule::StartsWith(arg) => format!("field '{field}' does not start with '{arg}'"),
            Rule::EndsWith(arg) => format!("field '{field}' does not end with '{arg}'"),
            Rule::OneOf(options) => {
                let options: Vec<String> = options.iter().map(Literal::quoted).collect();
                format!(
                    "field '{field}' should have one of these values: {}",
                    options.join(", ")
                )
            }
            Rule::Eq(lit) => format!("field '{field}' does not equal {lit}"),
            Rule::Neq(lit) => format!("field '{field}' should not be equal to {lit}"),
            Rule::Min(lit) => format!("field '{field}' has a minimum value of {lit}"),
            Rule::Max(lit) => format!("field '{field}' has a maximum value of {lit}"),
            Rule::MinLen(n) => format!("field '{field}' has a minimum length of {n}"),
            Rule::MaxLen(n) => format!("field '{field}' has a maximum length of {n}"),
        }
    }

    fn violation(&self) -> DecodeError {
        tracing::debug!(field = %self.field, constraint = self.name(), "constraint rejected input");
        DecodeError::violation(self.field.clone(), self.description())
    }

    /// Checks a just-decoded length prefix. Only length bounds can fail here.
    pub fn check_len(&self, len: usize) -> DecodeResult<()> {
        let ok = match self.rule {
            Rule::MinLen(n) => len >= n,
            Rule::MaxLen(n) => len <= n,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(self.violation())
        }
    }

    /// Checks a fully decoded value.
    ///
    /// Length bounds are checked against the value's length as well, so a
    /// constraint can be applied to values that did not come off the wire.
    pub fn check(&self, value: &Value) -> DecodeResult<()> {
        let value = match value {
            Value::Optional(None) => return Ok(()),
            Value::Optional(Some(inner)) => inner.as_ref(),
            other => other,
        };
        let ok = match &self.rule {
            Rule::Shape(shape) => value.as_str().map_or(false, |s| shape.matches(s)),
            Rule::Contains(arg) => value.as_str().map_or(false, |s| s.contains(arg.as_str())),
            Rule::StartsWith(arg) => value.as_str().map_or(false, |s| s.starts_with(arg.as_str())),
            Rule::EndsWith(arg) => value.as_str().map_or(false, |s| s.ends_with(arg.as_str())),
            Rule::OneOf(options) => options
                .iter()
                .any(|lit| lit.compare(value) == Some(Ordering::Equal)),
            Rule::Eq(lit) => lit.compare(value) == Some(Ordering::Equal),
            Rule::Neq(lit) => lit.compare(value) != Some(Ordering::Equal),
            Rule::Min(lit) => lit.compare(value) != Some(Ordering::Less),
            Rule::Max(lit) => lit.compare(value) != Some(Ordering::Greater),
            Rule::MinLen(n) => value.len().map_or(false, |len| len >= *n),
            Rule::MaxLen(n) => value.len().map_or(false, |len| len <= *n),
        };
        if ok {
            Ok(())
        } else {
            Err(self.violation())
        }
    }
}

/// Compiles constraint `name` with raw argument `args` for `field` of type `ty`.
///
/// # Errors
///
/// Fails if the name is unknown, the argument is missing or unexpected, the
/// constraint cannot apply to `ty`, or the argument does not parse as a
/// value of the field's scalar kind.
pub fn compile(
    name: &str,
    args: Option<&str>,
    field: &str,
    ty: &Type,
) -> Result<Constraint, ConstraintError> {
    let spec =
        registry::lookup(name).ok_or_else(|| ConstraintError::UnknownConstraint(name.to_owned()))?;
    let args = match (spec.arity, args.map(str::trim)) {
        (Arity::Required, None) | (Arity::Required, Some("")) => {
            return Err(ConstraintError::MissingArgument(name.to_owned()))
        }
        (Arity::None, Some(_)) => return Err(ConstraintError::UnexpectedArgument(name.to_owned())),
        (_, args) => args.unwrap_or_default(),
    };
    if !(spec.applies)(ty) {
        return Err(ConstraintError::Incompatible {
            name: name.to_owned(),
            ty: ty.to_string(),
        });
    }

    let (inner, optional) = ty.unwrap_optional();
    let literal = |raw: &str| -> Result<Literal, ConstraintError> {
        // applicability guarantees a scalar for every literal-taking rule
        let kind = inner.scalar_kind().ok_or_else(|| ConstraintError::Incompatible {
            name: name.to_owned(),
            ty: ty.to_string(),
        })?;
        Literal::parse(kind, raw).ok_or_else(|| ConstraintError::InvalidLiteral {
            name: name.to_owned(),
            literal: raw.to_owned(),
            kind: kind.to_string(),
        })
    };
    let length = |raw: &str| -> Result<usize, ConstraintError> {
        raw.parse::<usize>().map_err(|_| ConstraintError::InvalidLength {
            name: name.to_owned(),
            literal: raw.to_owned(),
        })
    };

    let rule = match spec.kind {
        RuleKind::Shape(shape) => Rule::Shape(shape),
        RuleKind::Contains => Rule::Contains(args.to_owned()),
        RuleKind::StartsWith => Rule::StartsWith(args.to_owned()),
        RuleKind::EndsWith => Rule::EndsWith(args.to_owned()),
        RuleKind::OneOf => {
            let options = args
                .split_whitespace()
                .map(&literal)
                .collect::<Result<Vec<_>, _>>()?;
            Rule::OneOf(options)
        }
        RuleKind::Eq => Rule::Eq(literal(args)?),
        RuleKind::Neq => Rule::Neq(literal(args)?),
        RuleKind::Min => Rule::Min(literal(args)?),
        RuleKind::Max => Rule::Max(literal(args)?),
        RuleKind::MinLen => Rule::MinLen(length(args)?),
        RuleKind::MaxLen => Rule::MaxLen(length(args)?),
    };

    Ok(Constraint {
        field: field.to_owned(),
        rule,
        optional,
    })
}

/// Splits constraints into before-read and after-read lists, each keeping
/// declaration order.
#[must_use]
pub fn split_phases(constraints: &[Constraint]) -> (Vec<Constraint>, Vec<Constraint>) {
    constraints
        .iter()
        .cloned()
        .partition(|c| c.phase() == Phase::BeforeRead)
}
