//! Schema model
//!
//! A [`Type`] is a closed, recursively defined description of a serializable
//! shape. Every match over it in this crate is exhaustive, so a new shape
//! cannot be added without visiting the builder, the codec engine and the
//! emitter.
//!
//! Schema nodes are immutable once [`build`](build::build) returns them. The
//! optional `name` carried by most variants is the display name of the named
//! type the node was expanded from; it only affects labeling and emitted
//! source, never the wire format.

use std::fmt::{self, Display};

use crate::constraint::Constraint;

pub mod build;
pub mod typeref;

pub use build::{build, build_named};

/// Scalar kinds with a fixed wire representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum ScalarKind {
    String,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 15] = [
        ScalarKind::String,
        ScalarKind::Bool,
        ScalarKind::Int,
        ScalarKind::Int8,
        ScalarKind::Int16,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Uint,
        ScalarKind::Uint8,
        ScalarKind::Uint16,
        ScalarKind::Uint32,
        ScalarKind::Uint64,
        ScalarKind::Uintptr,
        ScalarKind::Float32,
        ScalarKind::Float64,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint => "uint",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Uintptr => "uintptr",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
        }
    }

    /// Encoded width in bytes, or `None` for the length-prefixed `string`.
    ///
    /// The native `int`, `uint` and `uintptr` kinds are always 8 bytes wide.
    #[must_use]
    pub const fn width(self) -> Option<usize> {
        match self {
            ScalarKind::String => None,
            ScalarKind::Bool | ScalarKind::Int8 | ScalarKind::Uint8 => Some(1),
            ScalarKind::Int16 | ScalarKind::Uint16 => Some(2),
            ScalarKind::Int32 | ScalarKind::Uint32 | ScalarKind::Float32 => Some(4),
            ScalarKind::Int
            | ScalarKind::Int64
            | ScalarKind::Uint
            | ScalarKind::Uint64
            | ScalarKind::Uintptr
            | ScalarKind::Float64 => Some(8),
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::Int8
                | ScalarKind::Int16
                | ScalarKind::Int32
                | ScalarKind::Int64
        )
    }

    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            ScalarKind::Uint
                | ScalarKind::Uint8
                | ScalarKind::Uint16
                | ScalarKind::Uint32
                | ScalarKind::Uint64
                | ScalarKind::Uintptr
        )
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float32 | ScalarKind::Float64)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_signed() || self.is_unsigned() || self.is_float()
    }
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A serializable shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum Type {
    Scalar {
        kind: ScalarKind,
        name: Option<String>,
    },
    /// Presence byte followed by the element when present.
    Optional(Box<Type>),
    /// `len` elements, no prefix.
    FixedArray {
        len: usize,
        elem: Box<Type>,
        name: Option<String>,
    },
    Sequence {
        elem: Box<Type>,
        name: Option<String>,
    },
    Map {
        key: Box<Type>,
        value: Box<Type>,
        name: Option<String>,
    },
    /// Sequence of bytes moved in one bulk operation.
    ByteBuffer { name: Option<String> },
    Record(Record),
}

impl Type {
    #[must_use]
    pub fn scalar(kind: ScalarKind) -> Self {
        Type::Scalar { kind, name: None }
    }

    #[must_use]
    pub fn optional(elem: Type) -> Self {
        Type::Optional(Box::new(elem))
    }

    #[must_use]
    pub fn fixed_array(len: usize, elem: Type) -> Self {
        Type::FixedArray {
            len,
            elem: Box::new(elem),
            name: None,
        }
    }

    #[must_use]
    pub fn sequence(elem: Type) -> Self {
        Type::Sequence {
            elem: Box::new(elem),
            name: None,
        }
    }

    #[must_use]
    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
            name: None,
        }
    }

    #[must_use]
    pub fn byte_buffer() -> Self {
        Type::ByteBuffer { name: None }
    }

    /// Display name restored from the named type this node came from.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Scalar { name, .. }
            | Type::FixedArray { name, .. }
            | Type::Sequence { name, .. }
            | Type::Map { name, .. }
            | Type::ByteBuffer { name } => name.as_deref(),
            Type::Record(rec) => rec.name.as_deref(),
            Type::Optional(_) => None,
        }
    }

    /// Labels the node with a display name. Optional nodes have no name of
    /// their own and are returned unchanged.
    #[must_use]
    pub fn with_name(mut self, display_name: impl Into<String>) -> Self {
        let display_name = Some(display_name.into());
        match &mut self {
            Type::Scalar { name, .. }
            | Type::FixedArray { name, .. }
            | Type::Sequence { name, .. }
            | Type::Map { name, .. }
            | Type::ByteBuffer { name } => *name = display_name,
            Type::Record(rec) => rec.name = display_name,
            Type::Optional(_) => {}
        }
        self
    }

    /// Strips one level of `Optional`, reporting whether one was present.
    #[must_use]
    pub fn unwrap_optional(&self) -> (&Type, bool) {
        match self {
            Type::Optional(inner) => (inner, true),
            other => (other, false),
        }
    }

    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Type::Scalar { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Type::Record(rec) => Some(rec),
            _ => None,
        }
    }

    /// Smallest number of bytes any value of this type occupies on the wire,
    /// saturating at `usize::MAX`.
    #[must_use]
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Type::Scalar { kind, .. } => kind.width().unwrap_or(8),
            Type::Optional(_) => 1,
            Type::FixedArray { len, elem, .. } => len.saturating_mul(elem.min_encoded_len()),
            Type::Sequence { .. } | Type::Map { .. } | Type::ByteBuffer { .. } => 8,
            Type::Record(rec) => rec
                .wire_fields()
                .fold(0, |acc: usize, f| acc.saturating_add(f.ty.min_encoded_len())),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        match self {
            Type::Scalar { kind, .. } => Display::fmt(kind, f),
            Type::Optional(elem) => write!(f, "*{elem}"),
            Type::FixedArray { len, elem, .. } => write!(f, "[{len}]{elem}"),
            Type::Sequence { elem, .. } => write!(f, "[]{elem}"),
            Type::Map { key, value, .. } => write!(f, "map[{key}]{value}"),
            Type::ByteBuffer { .. } => f.write_str("[]byte"),
            Type::Record(rec) => {
                f.write_str("struct{")?;
                for (i, field) in rec.wire_fields().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// An ordered product of fields; declaration order is wire order.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct Record {
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

impl Record {
    #[must_use]
    pub fn new(name: Option<String>, fields: Vec<Field>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that appear on the wire, in order.
    pub fn wire_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.skip)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct Field {
    pub name: String,
    pub ty: Type,
    /// Checks evaluated during decode, in declaration order.
    pub constraints: Vec<Constraint>,
    /// Skipped fields are never encoded or decoded; decode leaves them zero.
    pub skip: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            constraints: Vec::new(),
            skip: false,
        }
    }

    #[must_use]
    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self.constraints.clear();
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }
}
