//! External type graph consumed by the schema builder
//!
//! The builder never inspects source declarations itself. Instead it walks a
//! tree of [`TypeRef`] nodes handed over by whatever tool discovered the
//! types, asking a [`Resolver`] to expand each named reference into its
//! underlying shape and canonical display name.

use std::collections::HashMap;
use std::fmt::{self, Display};

use super::ScalarKind;

/// Primitive kinds as they appear in the external type graph.
///
/// This is a superset of [`ScalarKind`]; the extra kinds exist so that a
/// discovered type can be described faithfully and then rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    String,
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
    Complex64,
    Complex128,
    UnsafePointer,
}

impl BasicKind {
    /// Maps to the corresponding scalar kind, or the reason there is none.
    pub fn scalar(self) -> Result<ScalarKind, UnsupportedShape> {
        Ok(match self {
            BasicKind::Bool => ScalarKind::Bool,
            BasicKind::String => ScalarKind::String,
            BasicKind::Int => ScalarKind::Int,
            BasicKind::Int8 => ScalarKind::Int8,
            BasicKind::Int16 => ScalarKind::Int16,
            BasicKind::Int32 => ScalarKind::Int32,
            BasicKind::Int64 => ScalarKind::Int64,
            BasicKind::Uint => ScalarKind::Uint,
            BasicKind::Uint8 => ScalarKind::Uint8,
            BasicKind::Uint16 => ScalarKind::Uint16,
            BasicKind::Uint32 => ScalarKind::Uint32,
            BasicKind::Uint64 => ScalarKind::Uint64,
            BasicKind::Uintptr => ScalarKind::Uintptr,
            BasicKind::Float32 => ScalarKind::Float32,
            BasicKind::Float64 => ScalarKind::Float64,
            BasicKind::Complex64 => return Err(UnsupportedShape::Complex64),
            BasicKind::Complex128 => return Err(UnsupportedShape::Complex128),
            BasicKind::UnsafePointer => return Err(UnsupportedShape::UnsafePointer),
        })
    }
}

/// Reference to a type in the external graph.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    /// Reference to a named type, expanded through a [`Resolver`].
    Named(String),
    Basic(BasicKind),
    /// Nullable indirection; becomes an optional value.
    Pointer(Box<TypeRef>),
    Array(usize, Box<TypeRef>),
    Slice(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    Struct(Vec<FieldRef>),
    Chan(Box<TypeRef>),
    Func,
    Interface,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn pointer(elem: TypeRef) -> Self {
        Self::Pointer(Box::new(elem))
    }

    pub fn array(len: usize, elem: TypeRef) -> Self {
        Self::Array(len, Box::new(elem))
    }

    pub fn slice(elem: TypeRef) -> Self {
        Self::Slice(Box::new(elem))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub const STRING: TypeRef = TypeRef::Basic(BasicKind::String);
    pub const BOOL: TypeRef = TypeRef::Basic(BasicKind::Bool);
}

/// A struct field as discovered in the source declarations.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRef {
    pub name: String,
    pub ty: TypeRef,
    /// Raw comma-separated constraint tag, possibly empty.
    pub tag: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: String::new(),
        }
    }

    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// Result of resolving a named type.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedType {
    /// Name restored onto the built node for labeling and source emission.
    pub display_name: String,
    pub underlying: TypeRef,
}

/// Expands named type references into their underlying shapes.
pub trait Resolver {
    fn resolve(&self, name: &str) -> Option<&NamedType>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, name: &str) -> Option<&NamedType> {
        (**self).resolve(name)
    }
}

/// `HashMap`-backed [`Resolver`] keyed by canonical type name.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, NamedType>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` with itself as display name.
    #[must_use]
    pub fn define(self, name: impl Into<String>, underlying: TypeRef) -> Self {
        let name = name.into();
        self.define_as(name.clone(), name, underlying)
    }

    /// Registers `name` under a distinct display name, e.g. a
    /// package-qualified canonical key shown by its short name.
    #[must_use]
    pub fn define_as(
        mut self,
        name: impl Into<String>,
        display_name: impl Into<String>,
        underlying: TypeRef,
    ) -> Self {
        self.insert(name, display_name, underlying);
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        display_name: impl Into<String>,
        underlying: TypeRef,
    ) -> Option<NamedType> {
        self.types.insert(
            name.into(),
            NamedType {
                display_name: display_name.into(),
                underlying,
            },
        )
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Resolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }
}

/// Type shapes that have no wire representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedShape {
    Chan,
    Func,
    Interface,
    Complex64,
    Complex128,
    UnsafePointer,
}

impl Display for UnsupportedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnsupportedShape::Chan => "channel",
            UnsupportedShape::Func => "function",
            UnsupportedShape::Interface => "interface",
            UnsupportedShape::Complex64 => "complex64",
            UnsupportedShape::Complex128 => "complex128",
            UnsupportedShape::UnsafePointer => "unsafe pointer",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_display_name() {
        let reg = TypeRegistry::new()
            .define("Id", TypeRef::Basic(BasicKind::Uint64))
            .define_as("model.User", "User", TypeRef::Struct(vec![]));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.resolve("model.User").map(|t| t.display_name.as_str()), Some("User"));
        assert_eq!(
            (&reg).resolve("Id").map(|t| &t.underlying),
            Some(&TypeRef::Basic(BasicKind::Uint64))
        );
        assert!(reg.resolve("User").is_none());
    }

    #[test]
    fn complex_kinds_unsupported() {
        assert_eq!(BasicKind::Int16.scalar(), Ok(ScalarKind::Int16));
        assert_eq!(BasicKind::Complex128.scalar(), Err(UnsupportedShape::Complex128));
        assert_eq!(UnsupportedShape::UnsafePointer.to_string(), "unsafe pointer");
    }
}
