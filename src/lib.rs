//! Compiler from record schemas to binary codecs with decode-time validation
//!
//! # Overview
//!
//! This library takes a description of a record type, as produced by some
//! external type-introspection front end, and turns it into a pair of
//! procedures: one that serializes values of the record into a compact,
//! deterministic binary form, and one that reads that form back while
//! enforcing the field-level constraints declared alongside the schema.
//!
//! The pipeline has three stages:
//!
//! 1. [`schema::build`] resolves an external [`TypeRef`] graph through a
//!    [`Resolver`] into the closed [`Type`] model, rejecting types that
//!    contain themselves and shapes that have no wire form.
//! 2. While building, every field tag is parsed and each declared constraint
//!    is compiled against the field's resolved type by [`constraint::compile`].
//!    A constraint that cannot apply to its field is a build error, never a
//!    decode-time surprise.
//! 3. [`Codec::compile`] produces the encode and decode procedures. They can
//!    be run directly over dynamic [`Value`]s, or rendered as Rust source with
//!    [`emit::render`], in which case the output targets the [`conv::Encode`]
//!    and [`conv::Decode`] runtime in this same crate.
//!
//! [`compile::compile_record`] chains the three stages for a single named
//! record.
//!
//! # Wire format
//!
//! The format carries no self-description. Scalars are fixed-width little
//! endian, with the native `int`, `uint` and `uintptr` kinds always eight
//! bytes; `bool` is a single byte. Strings, sequences, maps and byte buffers
//! are preceded by an 8-byte zig-zag length prefix. Optionals carry a
//! presence byte. Fixed arrays and records are their elements back to back,
//! in declaration order, with nothing in between.
//!
//! # Validation
//!
//! Constraints only ever run while decoding. Length bounds are checked as
//! soon as the length prefix has been read, before the body is touched, so
//! that an oversized value is rejected without being materialized. All other
//! constraints run on the decoded value in the order they were declared, and
//! the first one to fail ends the decode with a
//! [`DecodeError::ConstraintViolation`].

pub mod codec;
pub mod compile;
pub mod constraint;
pub mod conv;
pub mod emit;
pub mod error;
mod internal;
pub mod parse;
pub mod schema;

pub use crate::codec::{Codec, RecordValue, Value};
pub use crate::compile::{compile_all, compile_record, CompiledRecord};
pub use crate::constraint::{Constraint, Rule, StringShape};
pub use crate::conv::{target::Target, Bytes, Decode, Encode};
pub use crate::emit::{render, render_string, EmitError, EmitOptions};
pub use crate::error::{ConstraintError, EncodeError, SchemaError};
pub use crate::parse::{DecodeError, DecodeResult, Parser, SliceParser, TryIntoParser};
pub use crate::schema::typeref::{FieldRef, Resolver, TypeRef, TypeRegistry};
pub use crate::schema::{Field, Record, ScalarKind, Type};
