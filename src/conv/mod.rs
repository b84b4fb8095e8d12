//! Core of the binary-conversion API
//!
//! This module contains definitions for the high-level transcoding traits
//! `Encode` and `Decode`, together with their implementations for every
//! scalar and container shape the wire format knows about. These are the
//! runtime that source rendered by [`crate::emit`] is written against; the
//! dynamic [`Codec`](crate::codec::Codec) interpreter follows exactly the
//! same byte layout.
//!
//! # Layout
//!
//! * Scalars are fixed-width little-endian; `bool` is one byte; the native
//!   `isize`/`usize` words always occupy eight bytes.
//! * `String`, `Vec<T>`, [`Bytes`], `HashMap` and `BTreeMap` are preceded by an
//!   8-byte zig-zag length prefix (see [`target::write_len`]).
//! * `Option<T>` is a presence byte followed by the value when present.
//! * `[T; N]` is `N` elements back to back, without prefix.
//!
//! The [`Prefixed`] trait splits prefix from body for the length-prefixed
//! types so that a length bound can be evaluated between the two; see
//! [`parse_gated`].
//!
//! An additional submodule, [`target`], offers an abstraction along the lines of [`std::io::Write`], namely the
//! [`target::Target`] trait. This is the dual to [`crate::parse::Parser`], acting as the generic
//! bound for serialization in the [`Encode::write_to`] method.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::parse::{DecodeError, DecodeResult, Parser, TryIntoParser};

use self::target::{write_len, Target};

pub mod bytes;
pub mod target;

pub use bytes::Bytes;

/// Trait for types that support serialization into the record wire format
///
/// Implementing [`Encode`] can be as simple as providing a definition of the required method
/// [`write_to`], but for types that have efficient overrides for the other default-implemented
/// methods, such optimizations are recommended as long as the implementations conform to the
/// specified invariants of each method.
///
/// [`write_to`]: Encode::write_to
pub trait Encode {
    /// Appends the serialized bytes of this value to a generic buffer,
    /// returning the exact number of bytes written
    ///
    /// Morally related to the trait method [`std::io::Write::write`], with the caveat
    /// that `write_to` is infallible, as well as being generic over any buffer that
    /// satisfies the trait-bound of [`Target`].
    fn write_to<U: Target>(&self, buf: &mut U) -> usize;

    /// Appends the serialized bytes of this value to a monomorphized [`Vec<u8>`] buffer.
    #[inline]
    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        let _ = self.write_to(buf);
    }

    /// Creates a new buffer and fills it with the serialized bytes of this value.
    #[must_use]
    #[inline]
    fn encode<U: Target + Default>(&self) -> U {
        let mut buf = U::default();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    /// Computes, without allocation, the number of bytes in the serialized
    /// form of `self` by writing into a [`target::ByteCounter`].
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut std::io::sink())
    }

    /// Creates a [`Vec<u8>`] sized to [`enc_len`](Encode::enc_len) and fills
    /// it with the serialized bytes of this value.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.enc_len());
        self.write_to_vec(&mut buf);
        buf
    }
}

/// Trait providing methods for deserializing binary data into values of a certain type
///
/// Implementations are defined by one required method, [`parse`](Decode::parse),
/// which consumes the contextually appropriate number of bytes from a
/// [`Parser`], either returning a valid value or an error if parsing failed
/// or yielded a value rejected by a field constraint.
pub trait Decode {
    /// Attempt to consume and interpret a value of type `Self` from an existing
    /// `Parser` object over a binary buffer.
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self>
    where
        Self: Sized;

    /// Attempt to decode a value of the `Self` type from any byte container
    /// that can be turned into a parser.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by [`parse`](Decode::parse). If the
    /// feature-flag `check_complete_parse` is enabled, leftover input is also
    /// reported as [`DecodeError::TrailingBytes`].
    fn try_decode<'a, U>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        U: TryIntoParser<'a>,
    {
        let mut p = input.try_into_parser()?;
        let ret = Self::parse(&mut p)?;
        cfg_if::cfg_if! {
            if #[cfg(feature = "check_complete_parse")] {
                p.ensure_consumed()?;
            }
        }
        Ok(ret)
    }
}

/// Types whose serialized body follows an 8-byte length prefix
///
/// The prefix counts elements for collections and bytes for `String` and
/// [`Bytes`].
pub trait Prefixed: Sized {
    /// Parses the body of a value whose length prefix `len` has already been
    /// consumed.
    fn parse_body<P: Parser>(p: &mut P, len: usize) -> DecodeResult<Self>;
}

/// Reads a length prefix, runs `check` on it, and only then reads the body.
///
/// This is how a before-read constraint rejects an oversized value without
/// materializing it.
pub fn parse_gated<T, P, F>(p: &mut P, check: F) -> DecodeResult<T>
where
    T: Prefixed,
    P: Parser,
    F: FnOnce(usize) -> DecodeResult<()>,
{
    let len = p.take_len()?;
    check(len)?;
    T::parse_body(p, len)
}

/// As [`parse_gated`], for an optional length-prefixed value. An absent value
/// is never checked.
pub fn parse_gated_opt<T, P, F>(p: &mut P, check: F) -> DecodeResult<Option<T>>
where
    T: Prefixed,
    P: Parser,
    F: FnOnce(usize) -> DecodeResult<()>,
{
    if p.take_presence()? {
        Ok(Some(parse_gated(p, check)?))
    } else {
        Ok(None)
    }
}

macro_rules! impl_numeric {
    ($($t:ty => $take:ident),* $(,)?) => {
        $(
            impl Encode for $t {
                #[inline]
                fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                    buf.push_many(self.to_le_bytes())
                }
            }

            impl Decode for $t {
                #[inline]
                fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
                    p.$take()
                }
            }
        )*
    };
}

impl_numeric!(
    u8 => take_u8,
    i8 => take_i8,
    u16 => take_u16,
    i16 => take_i16,
    u32 => take_u32,
    i32 => take_i32,
    u64 => take_u64,
    i64 => take_i64,
    f32 => take_f32,
    f64 => take_f64,
);

impl Encode for isize {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_many((*self as i64).to_le_bytes())
    }
}

impl Decode for isize {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let raw = p.take_i64()?;
        isize::try_from(raw).map_err(|_| DecodeError::NativeOverflow(raw as i128))
    }
}

impl Encode for usize {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_many((*self as u64).to_le_bytes())
    }
}

impl Decode for usize {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let raw = p.take_u64()?;
        usize::try_from(raw).map_err(|_| DecodeError::NativeOverflow(raw as i128))
    }
}

impl Encode for bool {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(u8::from(*self))
    }
}

impl Decode for bool {
    #[inline]
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        p.take_bool()
    }
}

impl Encode for String {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_len(buf, self.len()) + buf.push_all(self.as_bytes())
    }
}

impl Prefixed for String {
    fn parse_body<P: Parser>(p: &mut P, len: usize) -> DecodeResult<Self> {
        let raw = p.consume(len)?.to_vec();
        Ok(String::from_utf8(raw)?)
    }
}

impl Decode for String {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let len = p.take_len()?;
        Self::parse_body(p, len)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            Some(val) => buf.push_one(1) + val.write_to(buf),
            None => buf.push_one(0),
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        if p.take_presence()? {
            Ok(Some(T::parse(p)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.iter().map(|x| x.write_to(buf)).sum()
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let mut elems = Vec::with_capacity(N);
        for _ in 0..N {
            elems.push(T::parse(p)?);
        }
        match <[T; N]>::try_from(elems) {
            Ok(arr) => Ok(arr),
            Err(_) => unreachable!("exactly {} elements were parsed", N),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_len(buf, self.len()) + self.iter().map(|x| x.write_to(buf)).sum::<usize>()
    }
}

impl<T: Decode> Prefixed for Vec<T> {
    fn parse_body<P: Parser>(p: &mut P, len: usize) -> DecodeResult<Self> {
        let mut ret = Vec::with_capacity(len.min(p.remainder()));
        for _ in 0..len {
            ret.push(T::parse(p)?);
        }
        Ok(ret)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let len = p.take_len()?;
        Self::parse_body(p, len)
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_len(buf, self.len())
            + self
                .iter()
                .map(|(k, v)| k.write_to(buf) + v.write_to(buf))
                .sum::<usize>()
    }
}

impl<K: Decode + Eq + Hash, V: Decode> Decode for HashMap<K, V> {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let len = p.take_len()?;
        let mut ret = HashMap::with_capacity(len.min(p.remainder()));
        for _ in 0..len {
            let k = K::parse(p)?;
            let v = V::parse(p)?;
            ret.insert(k, v);
        }
        Ok(ret)
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_len(buf, self.len())
            + self
                .iter()
                .map(|(k, v)| k.write_to(buf) + v.write_to(buf))
                .sum::<usize>()
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        let len = p.take_len()?;
        let mut ret = BTreeMap::new();
        for _ in 0..len {
            let k = K::parse(p)?;
            let v = V::parse(p)?;
            ret.insert(k, v);
        }
        Ok(ret)
    }
}
