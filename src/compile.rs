//! Per-record compilation driver
//!
//! Ties the pipeline together for one named record: build the schema with a
//! fresh cycle guard, compile the codec, and collect what emitted source for
//! the record will need besides this crate's runtime.

use std::collections::BTreeSet;

use tracing::debug;

use crate::codec::{Codec, Value};
use crate::constraint::{Rule, StringShape};
use crate::error::{EncodeError, SchemaError};
use crate::parse::{DecodeResult, TryIntoParser};
use crate::schema::typeref::Resolver;
use crate::schema::{build_named, Record, Type};

/// A record schema together with its compiled codec.
#[derive(Clone, Debug)]
pub struct CompiledRecord {
    /// Canonical name the record was compiled from.
    pub name: String,
    pub schema: Record,
    pub codec: Codec,
    /// String shapes checked through a precompiled pattern, anywhere in the
    /// record or the records nested in it.
    pub patterns: BTreeSet<StringShape>,
    /// External crates the emitted checks depend on.
    pub deps: BTreeSet<&'static str>,
}

impl CompiledRecord {
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.codec.encode(value)
    }

    pub fn decode<'a, U: TryIntoParser<'a>>(&self, input: U) -> DecodeResult<Value> {
        self.codec.decode(input)
    }
}

/// Compiles the record named `name`.
///
/// # Errors
///
/// Any [`SchemaError`] raised while building the schema, or
/// [`SchemaError::NotARecord`] if `name` resolves to some other shape.
pub fn compile_record<R: Resolver + ?Sized>(
    name: &str,
    resolver: &R,
) -> Result<CompiledRecord, SchemaError> {
    let ty = build_named(name, resolver)?;
    let codec = Codec::compile(&ty);
    let schema = match ty {
        Type::Record(rec) => rec,
        other => return Err(SchemaError::NotARecord(other.to_string())),
    };

    let mut shapes = BTreeSet::new();
    collect_shapes(&schema, &mut shapes);
    let patterns: BTreeSet<StringShape> = shapes
        .iter()
        .copied()
        .filter(|shape| shape.pattern().is_some())
        .collect();
    let mut deps = BTreeSet::new();
    if !patterns.is_empty() {
        deps.extend(["lazy_static", "regex"]);
    }
    if shapes.contains(&StringShape::Url) {
        deps.insert("url");
    }

    debug!(
        record = name,
        fields = schema.fields.len(),
        patterns = patterns.len(),
        "compiled record"
    );
    Ok(CompiledRecord {
        name: name.to_owned(),
        schema,
        codec,
        patterns,
        deps,
    })
}

/// Compiles each of `names` independently. A failure only affects the
/// record it belongs to; the caller decides whether to go on.
pub fn compile_all<'n, R, I>(
    names: I,
    resolver: &R,
) -> Vec<(String, Result<CompiledRecord, SchemaError>)>
where
    R: Resolver + ?Sized,
    I: IntoIterator<Item = &'n str>,
{
    names
        .into_iter()
        .map(|name| (name.to_owned(), compile_record(name, resolver)))
        .collect()
}

fn collect_shapes(rec: &Record, out: &mut BTreeSet<StringShape>) {
    for field in rec.wire_fields() {
        for constraint in &field.constraints {
            if let Rule::Shape(shape) = constraint.rule {
                out.insert(shape);
            }
        }
        collect_nested(&field.ty, out);
    }
}

fn collect_nested(ty: &Type, out: &mut BTreeSet<StringShape>) {
    match ty {
        Type::Scalar { .. } | Type::ByteBuffer { .. } => {}
        Type::Optional(elem) | Type::FixedArray { elem, .. } | Type::Sequence { elem, .. } => {
            collect_nested(elem, out)
        }
        Type::Map { key, value, .. } => {
            collect_nested(key, out);
            collect_nested(value, out);
        }
        Type::Record(rec) => collect_shapes(rec, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::typeref::{BasicKind, FieldRef, TypeRef, TypeRegistry};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .define(
                "Contact",
                TypeRef::Struct(vec![
                    FieldRef::new("Email", TypeRef::STRING).tagged("email"),
                    FieldRef::new("Site", TypeRef::pointer(TypeRef::STRING)).tagged("url"),
                ]),
            )
            .define(
                "User",
                TypeRef::Struct(vec![
                    FieldRef::new("Id", TypeRef::STRING).tagged("uuid"),
                    FieldRef::new("Name", TypeRef::STRING).tagged("alpha"),
                    FieldRef::new("Contacts", TypeRef::slice(TypeRef::named("Contact"))),
                ]),
            )
            .define("Plain", TypeRef::Struct(vec![FieldRef::new("N", TypeRef::Basic(BasicKind::Int))]))
            .define("Blob", TypeRef::slice(TypeRef::Basic(BasicKind::Uint8)))
            .define(
                "Loop",
                TypeRef::Struct(vec![FieldRef::new("Next", TypeRef::pointer(TypeRef::named("Loop")))]),
            )
    }

    #[test]
    fn collects_nested_patterns_and_deps() {
        let rec = compile_record("User", &registry()).unwrap();
        assert_eq!(
            rec.patterns.iter().copied().collect::<Vec<_>>(),
            [StringShape::Alpha, StringShape::Email, StringShape::Uuid]
        );
        assert_eq!(
            rec.deps.iter().copied().collect::<Vec<_>>(),
            ["lazy_static", "regex", "url"]
        );
        assert_eq!(rec.codec.label(), "User");
    }

    #[test]
    fn plain_record_needs_nothing() {
        let rec = compile_record("Plain", &registry()).unwrap();
        assert!(rec.patterns.is_empty());
        assert!(rec.deps.is_empty());
        let value = Value::Record(crate::codec::RecordValue::new().with("N", Value::Int(-4)));
        assert_eq!(rec.decode(&rec.encode(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn non_records_rejected() {
        assert_eq!(
            compile_record("Blob", &registry()).unwrap_err(),
            SchemaError::NotARecord(String::from("Blob"))
        );
        assert_eq!(
            compile_record("Nope", &registry()).unwrap_err(),
            SchemaError::UnknownType(String::from("Nope"))
        );
    }

    #[test]
    fn failures_stay_per_record() {
        let results = compile_all(["Loop", "Plain"], &registry());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Loop");
        assert!(matches!(
            results[0].1.as_ref().map_err(SchemaError::root_cause),
            Err(SchemaError::CyclicType(_))
        ));
        assert!(results[1].1.is_ok());
    }
}
