//! Schema-driven codec interpreter
//!
//! A [`Codec`] is compiled once from a [`Type`] into a tree of procedures
//! and then run against dynamic [`Value`]s. It follows byte-for-byte the
//! layout of the [`Encode`](crate::conv::Encode) and
//! [`Decode`](crate::conv::Decode) implementations that emitted source relies
//! on, so a value encoded by one side decodes on the other.
//!
//! Decoding is eager and depth-first. For every field that carries
//! constraints, length bounds are checked between the length prefix and the
//! body, and all other constraints are checked on the decoded value in
//! declaration order. Encoding never evaluates constraints.

use std::collections::hash_map::{Entry, HashMap};
use std::io::Write;

use tracing::trace;

use crate::constraint::{split_phases, Constraint};
use crate::conv::target::{write_len, Target, WriteTarget};
use crate::conv::Bytes;
use crate::error::EncodeError;
use crate::parse::{DecodeResult, Parser, TryIntoParser};
use crate::schema::{Field, ScalarKind, Type};

pub mod value;

pub use value::{Number, RecordValue, Value};


/// Compiled encode and decode procedures for one schema type.
#[derive(Clone, Debug)]
pub struct Codec {
    label: String,
    root: Node,
}

#[derive(Clone, Debug)]
enum Node {
    Scalar(ScalarKind),
    Optional(Box<Node>),
    FixedArray { len: usize, elem: Box<Node> },
    Prefixed(Body),
    Record(Vec<FieldNode>),
}

/// Shapes whose body follows a length prefix. `width` is the smallest
/// encoded size of one element or entry, never zero.
#[derive(Clone, Debug)]
enum Body {
    Str,
    Sequence { elem: Box<Node>, width: usize },
    Map { key: Box<Node>, value: Box<Node>, width: usize },
    Bytes,
}

#[derive(Clone, Debug)]
struct FieldNode {
    name: String,
    slot: Slot,
}

#[derive(Clone, Debug)]
enum Slot {
    Wire {
        node: Node,
        before: Vec<Constraint>,
        after: Vec<Constraint>,
    },
    /// Never on the wire; decodes to the stored zero value.
    Skipped(Value),
}

impl Node {
    fn compile(ty: &Type) -> Node {
        match ty {
            Type::Scalar {
                kind: ScalarKind::String,
                ..
            } => Node::Prefixed(Body::Str),
            Type::Scalar { kind, .. } => Node::Scalar(*kind),
            Type::Optional(elem) => Node::Optional(Box::new(Node::compile(elem))),
            Type::FixedArray { len, elem, .. } => Node::FixedArray {
                len: *len,
                elem: Box::new(Node::compile(elem)),
            },
            Type::Sequence { elem, .. } => Node::Prefixed(Body::Sequence {
                elem: Box::new(Node::compile(elem)),
                width: elem.min_encoded_len().max(1),
            }),
            Type::Map { key, value, .. } => Node::Prefixed(Body::Map {
                key: Box::new(Node::compile(key)),
                value: Box::new(Node::compile(value)),
                width: key.min_encoded_len().saturating_add(value.min_encoded_len()).max(1),
            }),
            Type::ByteBuffer { .. } => Node::Prefixed(Body::Bytes),
            Type::Record(rec) => Node::Record(rec.fields.iter().map(FieldNode::compile).collect()),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Node::Scalar(kind) => kind.name(),
            Node::Optional(_) => "optional",
            Node::FixedArray { .. } => "array",
            Node::Prefixed(Body::Str) => "string",
            Node::Prefixed(Body::Sequence { .. }) => "sequence",
            Node::Prefixed(Body::Map { .. }) => "map",
            Node::Prefixed(Body::Bytes) => "bytes",
            Node::Record(_) => "record",
        }
    }

    fn mismatch(&self, found: &Value) -> EncodeError {
        EncodeError::Mismatch {
            expected: self.expected().to_owned(),
            found: found.kind_name(),
        }
    }

    fn write<U: Target>(&self, value: &Value, buf: &mut U) -> Result<usize, EncodeError> {
        match (self, value) {
            (Node::Scalar(kind), value) => write_scalar(*kind, value, buf).ok_or_else(|| self.mismatch(value)),
            (Node::Optional(_), Value::Optional(None)) => Ok(buf.push_one(0)),
            (Node::Optional(elem), Value::Optional(Some(inner))) => {
                Ok(buf.push_one(1) + elem.write(inner, buf)?)
            }
            (Node::FixedArray { len, elem }, Value::Array(items)) => {
                if items.len() != *len {
                    return Err(EncodeError::ArrayLength {
                        expected: *len,
                        found: items.len(),
                    });
                }
                write_all(elem, items, buf)
            }
            (Node::Prefixed(Body::Str), Value::String(s)) => {
                Ok(write_len(buf, s.len()) + buf.push_all(s.as_bytes()))
            }
            (Node::Prefixed(Body::Sequence { elem, .. }), Value::Sequence(items)) => {
                Ok(write_len(buf, items.len()) + write_all(elem, items, buf)?)
            }
            (Node::Prefixed(Body::Map { key, value, .. }), Value::Map(entries)) => {
                let mut n = write_len(buf, entries.len());
                for (k, v) in entries {
                    n += key.write(k, buf)?;
                    n += value.write(v, buf)?;
                }
                Ok(n)
            }
            (Node::Prefixed(Body::Bytes), Value::Bytes(bytes)) => {
                buf.anticipate(8 + bytes.len());
                Ok(write_len(buf, bytes.len()) + buf.push_all(&bytes.0))
            }
            (Node::Record(fields), Value::Record(rec)) => {
                let mut n = 0;
                for field in fields {
                    if let Slot::Wire { node, .. } = &field.slot {
                        let value = rec
                            .get(&field.name)
                            .ok_or_else(|| EncodeError::MissingField(field.name.clone()))?;
                        n += node.write(value, buf)?;
                    }
                }
                Ok(n)
            }
            (node, value) => Err(node.mismatch(value)),
        }
    }

    fn read<P: Parser>(&self, p: &mut P) -> DecodeResult<Value> {
        match self {
            Node::Scalar(kind) => read_scalar(*kind, p),
            Node::Optional(elem) => {
                if p.take_presence()? {
                    Ok(Value::some(elem.read(p)?))
                } else {
                    Ok(Value::none())
                }
            }
            Node::FixedArray { len, elem } => {
                let mut items = Vec::with_capacity((*len).min(p.remainder()));
                for _ in 0..*len {
                    items.push(elem.read(p)?);
                }
                Ok(Value::Array(items))
            }
            Node::Prefixed(body) => body.read(p, &[]),
            Node::Record(fields) => {
                let mut rec = RecordValue {
                    fields: Vec::with_capacity(fields.len()),
                };
                for field in fields {
                    let value = field.read(p)?;
                    rec.fields.push((field.name.clone(), value));
                }
                Ok(Value::Record(rec))
            }
        }
    }
}

impl Body {
    /// Reads a length prefix, checks it against `gate`, then reads the body.
    fn read<P: Parser>(&self, p: &mut P, gate: &[Constraint]) -> DecodeResult<Value> {
        let len = p.take_len()?;
        for constraint in gate {
            constraint.check_len(len)?;
        }
        match self {
            Body::Str => Ok(Value::String(String::from_utf8(p.consume(len)?.to_vec())?)),
            Body::Sequence { elem, width } => {
                let mut items = Vec::with_capacity(len.min(p.remainder() / *width));
                for _ in 0..len {
                    items.push(elem.read(p)?);
                }
                Ok(Value::Sequence(items))
            }
            Body::Map { key, value, width } => {
                let cap = len.min(p.remainder() / *width);
                let mut entries: Vec<(Value, Value)> = Vec::with_capacity(cap);
                let mut index: HashMap<Value, usize> = HashMap::with_capacity(cap);
                for _ in 0..len {
                    let k = key.read(p)?;
                    let v = value.read(p)?;
                    match index.entry(k) {
                        Entry::Occupied(slot) => entries[*slot.get()].1 = v,
                        Entry::Vacant(slot) => {
                            entries.push((slot.key().clone(), v));
                            slot.insert(entries.len() - 1);
                        }
                    }
                }
                Ok(Value::Map(entries))
            }
            Body::Bytes => Ok(Value::Bytes(Bytes(p.consume(len)?.to_vec()))),
        }
    }
}

impl FieldNode {
    fn compile(field: &Field) -> FieldNode {
        let slot = if field.skip {
            Slot::Skipped(Value::zero(&field.ty))
        } else {
            let (before, after) = split_phases(&field.constraints);
            Slot::Wire {
                node: Node::compile(&field.ty),
                before,
                after,
            }
        };
        FieldNode {
            name: field.name.clone(),
            slot,
        }
    }

    fn read<P: Parser>(&self, p: &mut P) -> DecodeResult<Value> {
        let (node, before, after) = match &self.slot {
            Slot::Skipped(zero) => return Ok(zero.clone()),
            Slot::Wire {
                node,
                before,
                after,
            } => (node, before, after),
        };
        let value = match (node, before.is_empty()) {
            (Node::Prefixed(body), false) => body.read(p, before)?,
            (Node::Optional(elem), false) => match elem.as_ref() {
                Node::Prefixed(body) => {
                    if p.take_presence()? {
                        Value::some(body.read(p, before)?)
                    } else {
                        Value::none()
                    }
                }
                _ => node.read(p)?,
            },
            (node, _) => node.read(p)?,
        };
        for constraint in after {
            constraint.check(&value)?;
        }
        Ok(value)
    }
}

fn write_all<U: Target>(elem: &Node, items: &[Value], buf: &mut U) -> Result<usize, EncodeError> {
    let mut n = 0;
    for item in items {
        n += elem.write(item, buf)?;
    }
    Ok(n)
}

fn write_scalar<U: Target>(kind: ScalarKind, value: &Value, buf: &mut U) -> Option<usize> {
    let n = match (kind, value) {
        (ScalarKind::String, Value::String(s)) => write_len(buf, s.len()) + buf.push_all(s.as_bytes()),
        (ScalarKind::Bool, Value::Bool(b)) => buf.push_one(u8::from(*b)),
        (ScalarKind::Int, Value::Int(x)) | (ScalarKind::Int64, Value::Int64(x)) => {
            buf.push_many(x.to_le_bytes())
        }
        (ScalarKind::Int8, Value::Int8(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Int16, Value::Int16(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Int32, Value::Int32(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Uint, Value::Uint(x))
        | (ScalarKind::Uint64, Value::Uint64(x))
        | (ScalarKind::Uintptr, Value::Uintptr(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Uint8, Value::Uint8(x)) => buf.push_one(*x),
        (ScalarKind::Uint16, Value::Uint16(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Uint32, Value::Uint32(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Float32, Value::Float32(x)) => buf.push_many(x.to_le_bytes()),
        (ScalarKind::Float64, Value::Float64(x)) => buf.push_many(x.to_le_bytes()),
        _ => return None,
    };
    Some(n)
}

fn read_scalar<P: Parser>(kind: ScalarKind, p: &mut P) -> DecodeResult<Value> {
    Ok(match kind {
        ScalarKind::String => return Body::Str.read(p, &[]),
        ScalarKind::Bool => Value::Bool(p.take_bool()?),
        ScalarKind::Int => Value::Int(p.take_i64()?),
        ScalarKind::Int8 => Value::Int8(p.take_i8()?),
        ScalarKind::Int16 => Value::Int16(p.take_i16()?),
        ScalarKind::Int32 => Value::Int32(p.take_i32()?),
        ScalarKind::Int64 => Value::Int64(p.take_i64()?),
        ScalarKind::Uint => Value::Uint(p.take_u64()?),
        ScalarKind::Uint8 => Value::Uint8(p.take_u8()?),
        ScalarKind::Uint16 => Value::Uint16(p.take_u16()?),
        ScalarKind::Uint32 => Value::Uint32(p.take_u32()?),
        ScalarKind::Uint64 => Value::Uint64(p.take_u64()?),
        ScalarKind::Uintptr => Value::Uintptr(p.take_u64()?),
        ScalarKind::Float32 => Value::Float32(p.take_f32()?),
        ScalarKind::Float64 => Value::Float64(p.take_f64()?),
    })
}

impl Codec {
    /// Compiles the procedures for `ty`. Constraints are split into their
    /// phases here, once, rather than on every decode.
    #[must_use]
    pub fn compile(ty: &Type) -> Self {
        Self {
            label: ty.to_string(),
            root: Node::compile(ty),
        }
    }

    /// Display form of the type this codec was compiled from.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Appends the encoding of `value` to `buf`, returning the number of
    /// bytes written.
    ///
    /// # Errors
    ///
    /// Fails if `value` does not have the shape of the schema. Bytes written
    /// before the mismatch was found stay in `buf`.
    pub fn encode_to<U: Target>(&self, value: &Value, buf: &mut U) -> Result<usize, EncodeError> {
        self.root.write(value, buf)
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        self.encode_to(value, &mut buf)?;
        Ok(buf)
    }

    /// Number of bytes [`encode`](Codec::encode) would produce.
    pub fn encoded_len(&self, value: &Value) -> Result<usize, EncodeError> {
        self.encode_to(value, &mut std::io::sink())
    }

    /// Streams the encoding of `value` into `writer` and returns the writer
    /// once flushed.
    pub fn encode_into_writer<W: Write>(&self, value: &Value, writer: W) -> Result<W, EncodeError> {
        let mut tgt = WriteTarget::new(writer);
        self.encode_to(value, &mut tgt)?;
        Ok(tgt.finish()?)
    }

    /// Decodes one value from the front of `p`, leaving the parser just past
    /// it.
    pub fn decode_from<P: Parser>(&self, p: &mut P) -> DecodeResult<Value> {
        trace!(ty = %self.label, offset = p.offset(), "decoding");
        self.root.read(p)
    }

    /// Decodes one value from `input`.
    ///
    /// # Errors
    ///
    /// Fails on truncated or malformed input and on the first constraint
    /// violation. With the `check_complete_parse` feature, leftover input is
    /// reported as [`TrailingBytes`](crate::parse::DecodeError::TrailingBytes).
    pub fn decode<'a, U: TryIntoParser<'a>>(&self, input: U) -> DecodeResult<Value> {
        let mut p = input.try_into_parser()?;
        let value = self.decode_from(&mut p)?;
        cfg_if::cfg_if! {
            if #[cfg(feature = "check_complete_parse")] {
                p.ensure_consumed()?;
            }
        }
        Ok(value)
    }
}
