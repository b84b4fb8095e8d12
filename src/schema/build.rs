//! Schema builder
//!
//! Walks an external [`TypeRef`] tree and produces the [`Type`] model,
//! expanding named references through a [`Resolver`]. A stack of the named
//! types currently being expanded travels with the walk; a name that is
//! already on the stack means the type contains itself, and the build fails
//! with [`SchemaError::CyclicType`]. Each expansion pops its own frame, so
//! sibling fields see the same stack and a type may appear any number of
//! times side by side.

use tracing::{debug, trace};

use super::typeref::{BasicKind, FieldRef, Resolver, TypeRef, UnsupportedShape};
use super::{Field, Record, Type};
use crate::constraint::{self, parse_tag};
use crate::error::SchemaError;
use crate::internal::frame::FrameStack;
use crate::internal::stack::Stack;

/// Builds the schema of `root`.
///
/// # Errors
///
/// Fails on cyclic or unsupported types, names the resolver does not know,
/// non-scalar map keys, malformed tags and constraints that do not fit their
/// field.
pub fn build<R: Resolver + ?Sized>(root: &TypeRef, resolver: &R) -> Result<Type, SchemaError> {
    Builder::new(resolver).build_type(root)
}

/// Builds the schema of the named type `name`.
pub fn build_named<R: Resolver + ?Sized>(name: &str, resolver: &R) -> Result<Type, SchemaError> {
    Builder::new(resolver).expand(name)
}

struct Builder<'r, R: ?Sized> {
    resolver: &'r R,
    frames: FrameStack,
}

impl<'r, R: Resolver + ?Sized> Builder<'r, R> {
    fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            frames: FrameStack::new(),
        }
    }

    fn build_type(&mut self, ty: &TypeRef) -> Result<Type, SchemaError> {
        match ty {
            TypeRef::Named(name) => self.expand(name),
            TypeRef::Basic(kind) => kind
                .scalar()
                .map(Type::scalar)
                .map_err(SchemaError::UnsupportedType),
            TypeRef::Pointer(elem) => Ok(Type::optional(self.build_type(elem)?)),
            TypeRef::Array(len, elem) => Ok(Type::fixed_array(*len, self.build_type(elem)?)),
            TypeRef::Slice(elem) => match elem.as_ref() {
                TypeRef::Basic(BasicKind::Uint8) => Ok(Type::byte_buffer()),
                elem => Ok(Type::sequence(self.build_type(elem)?)),
            },
            TypeRef::Map(key, value) => {
                let key = self.build_type(key)?;
                if key.unwrap_optional().0.scalar_kind().is_none() {
                    return Err(SchemaError::InvalidMapKey(key.to_string()));
                }
                Ok(Type::map(key, self.build_type(value)?))
            }
            TypeRef::Struct(fields) => self.build_record(fields).map(Type::Record),
            TypeRef::Chan(_) => Err(SchemaError::UnsupportedType(UnsupportedShape::Chan)),
            TypeRef::Func => Err(SchemaError::UnsupportedType(UnsupportedShape::Func)),
            TypeRef::Interface => Err(SchemaError::UnsupportedType(UnsupportedShape::Interface)),
        }
    }

    fn expand(&mut self, name: &str) -> Result<Type, SchemaError> {
        let resolver = self.resolver;
        let named = resolver
            .resolve(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_owned()))?;
        self.frames.push_validated(name.to_owned(), |frames, item| {
            frames
                .contains_item(item)
                .then(|| SchemaError::CyclicType(named.display_name.clone()))
        })?;
        trace!(ty = %named.display_name, depth = self.frames.depth(), frames = ?self.frames, "expanding named type");
        let built = self.build_type(&named.underlying);
        self.frames.pop();
        Ok(built?.with_name(named.display_name.as_str()))
    }

    fn build_record(&mut self, fields: &[FieldRef]) -> Result<Record, SchemaError> {
        let mut out: Vec<Field> = Vec::with_capacity(fields.len());
        for field in fields {
            if out.iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            let tag = parse_tag(&field.tag).map_err(|source| SchemaError::Constraint {
                field: field.name.clone(),
                source,
            })?;

            if tag.skip {
                match self.build_type(&field.ty) {
                    Ok(ty) => out.push(Field::new(field.name.as_str(), ty).skipped()),
                    Err(err) => {
                        debug!(field = %field.name, error = %err, "dropping skipped field with unresolvable type")
                    }
                }
                continue;
            }

            let ty = self
                .build_type(&field.ty)
                .map_err(|err| err.in_field(&field.name))?;
            let constraints = tag
                .constraints
                .iter()
                .map(|decl| constraint::compile(&decl.name, decl.args.as_deref(), &field.name, &ty))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| SchemaError::Constraint {
                    field: field.name.clone(),
                    source,
                })?;
            out.push(Field::new(field.name.as_str(), ty).with_constraints(constraints));
        }
        Ok(Record::new(None, out))
    }
}
