//! Dynamic values handled by the [`Codec`](super::Codec) interpreter

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::conv::Bytes;
use crate::schema::{ScalarKind, Type};

/// In-memory value of any schema type.
///
/// The native `int`, `uint` and `uintptr` kinds are held as 64-bit values,
/// matching their wire width.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(u64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uintptr(u64),
    Float32(f32),
    Float64(f64),
    Optional(Option<Box<Value>>),
    Array(Vec<Value>),
    Sequence(Vec<Value>),
    /// Entries in encode order.
    Map(Vec<(Value, Value)>),
    Bytes(Bytes),
    Record(RecordValue),
}

/// Numeric view of a scalar value, widened to 64 bits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Value {
    /// Zero value of `ty`: empty strings and containers, absent optionals,
    /// zero numbers and records of zero fields.
    #[must_use]
    pub fn zero(ty: &Type) -> Value {
        match ty {
            Type::Scalar { kind, .. } => match kind {
                ScalarKind::String => Value::String(String::new()),
                ScalarKind::Bool => Value::Bool(false),
                ScalarKind::Int => Value::Int(0),
                ScalarKind::Int8 => Value::Int8(0),
                ScalarKind::Int16 => Value::Int16(0),
                ScalarKind::Int32 => Value::Int32(0),
                ScalarKind::Int64 => Value::Int64(0),
                ScalarKind::Uint => Value::Uint(0),
                ScalarKind::Uint8 => Value::Uint8(0),
                ScalarKind::Uint16 => Value::Uint16(0),
                ScalarKind::Uint32 => Value::Uint32(0),
                ScalarKind::Uint64 => Value::Uint64(0),
                ScalarKind::Uintptr => Value::Uintptr(0),
                ScalarKind::Float32 => Value::Float32(0.0),
                ScalarKind::Float64 => Value::Float64(0.0),
            },
            Type::Optional(_) => Value::Optional(None),
            Type::FixedArray { len, elem, .. } => Value::Array(vec![Value::zero(elem); *len]),
            Type::Sequence { .. } => Value::Sequence(Vec::new()),
            Type::Map { .. } => Value::Map(Vec::new()),
            Type::ByteBuffer { .. } => Value::Bytes(Bytes::default()),
            Type::Record(rec) => Value::Record(RecordValue {
                fields: rec
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), Value::zero(&f.ty)))
                    .collect(),
            }),
        }
    }

    /// Name of the variant, used in mismatch diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint(_) => "uint",
            Value::Uint8(_) => "uint8",
            Value::Uint16(_) => "uint16",
            Value::Uint32(_) => "uint32",
            Value::Uint64(_) => "uint64",
            Value::Uintptr(_) => "uintptr",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Optional(_) => "optional",
            Value::Array(_) => "array",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Bytes(_) => "bytes",
            Value::Record(_) => "record",
        }
    }

    #[must_use]
    pub fn some(inner: Value) -> Value {
        Value::Optional(Some(Box::new(inner)))
    }

    #[must_use]
    pub fn none() -> Value {
        Value::Optional(None)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(rec) => Some(rec),
            _ => None,
        }
    }

    /// Length as counted by length constraints: bytes for strings and
    /// buffers, elements for sequences.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::Sequence(v) => Some(v.len()),
            Value::Bytes(b) => Some(b.len()),
            _ => None,
        }
    }

    #[must_use]
    pub fn number(&self) -> Option<Number> {
        Some(match *self {
            Value::Int(x) | Value::Int64(x) => Number::Signed(x),
            Value::Int8(x) => Number::Signed(x.into()),
            Value::Int16(x) => Number::Signed(x.into()),
            Value::Int32(x) => Number::Signed(x.into()),
            Value::Uint(x) | Value::Uint64(x) | Value::Uintptr(x) => Number::Unsigned(x),
            Value::Uint8(x) => Number::Unsigned(x.into()),
            Value::Uint16(x) => Number::Unsigned(x.into()),
            Value::Uint32(x) => Number::Unsigned(x.into()),
            Value::Float32(x) => Number::Float(x.into()),
            Value::Float64(x) => Number::Float(x),
            _ => return None,
        })
    }
}

impl Number {
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Signed(a), Number::Signed(b)) => Some(a.cmp(&b)),
            (Number::Unsigned(a), Number::Unsigned(b)) => Some(a.cmp(&b)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) | (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Uint(a), Value::Uint(b))
            | (Value::Uint64(a), Value::Uint64(b))
            | (Value::Uintptr(a), Value::Uintptr(b)) => a == b,
            (Value::Uint8(a), Value::Uint8(b)) => a == b,
            (Value::Uint16(a), Value::Uint16(b)) => a == b,
            (Value::Uint32(a), Value::Uint32(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Optional(a), Value::Optional(b)) => a == b,
            (Value::Array(a), Value::Array(b)) | (Value::Sequence(a), Value::Sequence(b)) => {
                a == b
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|entry| b.contains(entry))
            }
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Consistent with `PartialEq`: floats hash by bit pattern, and maps and
/// records, whose equality ignores order, hash only their size.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Int(x) | Value::Int64(x) => x.hash(state),
            Value::Int8(x) => x.hash(state),
            Value::Int16(x) => x.hash(state),
            Value::Int32(x) => x.hash(state),
            Value::Uint(x) | Value::Uint64(x) | Value::Uintptr(x) => x.hash(state),
            Value::Uint8(x) => x.hash(state),
            Value::Uint16(x) => x.hash(state),
            Value::Uint32(x) => x.hash(state),
            Value::Float32(x) => x.to_bits().hash(state),
            Value::Float64(x) => x.to_bits().hash(state),
            Value::Optional(v) => v.hash(state),
            Value::Array(items) | Value::Sequence(items) => items.hash(state),
            Value::Map(entries) => entries.len().hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Record(rec) => rec.fields.len().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(x) | Value::Int64(x) => write!(f, "{x}"),
            Value::Int8(x) => write!(f, "{x}"),
            Value::Int16(x) => write!(f, "{x}"),
            Value::Int32(x) => write!(f, "{x}"),
            Value::Uint(x) | Value::Uint64(x) | Value::Uintptr(x) => write!(f, "{x}"),
            Value::Uint8(x) => write!(f, "{x}"),
            Value::Uint16(x) => write!(f, "{x}"),
            Value::Uint32(x) => write!(f, "{x}"),
            Value::Float32(x) => write!(f, "{x}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::Optional(None) => f.write_str("nil"),
            Value::Optional(Some(v)) => write!(f, "&{v}"),
            Value::Array(items) | Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("]")
            }
            Value::Bytes(b) => write!(f, "{b:?}"),
            Value::Record(rec) => {
                f.write_str("{")?;
                for (i, (name, v)) in rec.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}:{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Field values of a record, by name.
///
/// Equality ignores field order.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct RecordValue {
    pub fields: Vec<(String, Value)>,
}

impl RecordValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](RecordValue::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, v)| other.get(name) == Some(v))
    }
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(x: $t) -> Self {
                    Value::$variant(x)
                }
            }
        )*
    };
}

impl_from!(
    String => String,
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Bytes => Bytes,
    RecordValue => Record,
);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Optional(opt.map(|v| Box::new(v.into())))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::schema::{Field, Record};

    #[test]
    fn floats_compare_bitwise() {
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
        assert_ne!(Value::Float32(0.0), Value::Float32(-0.0));
        assert_ne!(Value::Int(1), Value::Int64(1));
    }

    #[test]
    fn maps_and_records_ignore_order() {
        let a = Value::Map(vec![(Value::from("x"), Value::from(1u8)), (Value::from("y"), Value::from(2u8))]);
        let b = Value::Map(vec![(Value::from("y"), Value::from(2u8)), (Value::from("x"), Value::from(1u8))]);
        assert_eq!(a, b);

        let r1 = RecordValue::new().with("A", 1u8).with("B", "hi");
        let r2 = RecordValue::new().with("B", "hi").with("A", 1u8);
        assert_eq!(r1, r2);
        assert_ne!(r1, RecordValue::new().with("A", 1u8));
    }

    #[test]
    fn hash_agrees_with_eq() {
        let mut set = HashSet::new();
        assert!(set.insert(Value::Float64(f64::NAN)));
        assert!(!set.insert(Value::Float64(f64::NAN)));
        assert!(set.insert(Value::Float64(-0.0)));
        assert!(set.insert(Value::Int(1)));
        assert!(set.insert(Value::Int64(1)));
        assert!(set.insert(Value::some(Value::from("k"))));
        assert!(!set.insert(Value::some(Value::from("k"))));

        let a = Value::Map(vec![(Value::from("x"), Value::from(1u8)), (Value::from("y"), Value::from(2u8))]);
        let b = Value::Map(vec![(Value::from("y"), Value::from(2u8)), (Value::from("x"), Value::from(1u8))]);
        assert!(set.insert(a));
        assert!(!set.insert(b));
    }

    #[test]
    fn insert_replaces() {
        let mut rec = RecordValue::new().with("A", 1u8);
        rec.insert("A", 2u8);
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get("A"), Some(&Value::Uint8(2)));
    }

    #[test]
    fn zero_values() {
        let ty = Type::Record(Record::new(
            Some(String::from("T")),
            vec![
                Field::new("N", Type::scalar(ScalarKind::Int)),
                Field::new("P", Type::optional(Type::scalar(ScalarKind::String))),
                Field::new("A", Type::fixed_array(2, Type::scalar(ScalarKind::Bool))),
                Field::new("S", Type::sequence(Type::scalar(ScalarKind::Uint8))),
            ],
        ));
        let zero = Value::zero(&ty);
        let rec = zero.as_record().unwrap();
        assert_eq!(rec.get("N"), Some(&Value::Int(0)));
        assert_eq!(rec.get("P"), Some(&Value::none()));
        assert_eq!(rec.get("A"), Some(&Value::Array(vec![Value::Bool(false); 2])));
        assert_eq!(rec.get("S").and_then(Value::len), Some(0));
    }

    #[test]
    fn numbers_widen() {
        assert_eq!(Value::Int8(-3).number(), Some(Number::Signed(-3)));
        assert_eq!(Value::Float32(1.5).number(), Some(Number::Float(1.5)));
        assert_eq!(
            Number::Unsigned(3).compare(Number::Unsigned(5)),
            Some(Ordering::Less)
        );
        assert_eq!(Number::Signed(3).compare(Number::Unsigned(5)), None);
        assert_eq!(Value::from("x").number(), None);
    }
}
