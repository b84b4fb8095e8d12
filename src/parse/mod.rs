//! Byte-level parsing model
//!
//! This module provides the [`Parser`] trait, a stateful, non-backtracking
//! reader over an immutable byte buffer, together with the single
//! implementing type [`SliceParser`] and the conversion trait
//! [`TryIntoParser`] used to build one from the common byte containers.
//!
//! All multi-byte numeric `take_X` methods read **little-endian**. Length
//! prefixes are always eight bytes wide and carry a zig-zag folded signed
//! value (see [`crate::conv::target::zigzag`]).
//!
//! For type-aware decoding see the [`Decode`](crate::conv::Decode) trait,
//! which is built almost entirely on the methods defined here.

pub mod error;

pub use error::{DecodeError, DecodeResult};

use crate::conv::target::unzigzag;

/// # Parser
///
/// Abstraction over a stateful parse-object with default implementations of
/// the monomorphic `take_*` readers.
///
/// ## Model
///
/// * The Parser is constructed over an immutable byte-buffer.
/// * All parsing is non-backtracking with zero lookahead; a byte can only be
///   viewed by consuming it, after every preceding byte has been consumed.
/// * A fresh parser has `offset() == 0`, and `remainder()` is the largest `n`
///   for which `consume(n)` succeeds.
/// * A failed `consume` leaves the parser state unchanged.
pub trait Parser {
    /// Total length of the underlying buffer.
    fn view_len(&self) -> usize;

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;

    /// Number of bytes that may still be consumed.
    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    /// Consumes and returns a single byte.
    fn consume_byte(&mut self) -> DecodeResult<u8>;

    /// Consumes and returns a slice of exactly `nbytes` bytes.
    ///
    /// # Invariants
    ///
    /// This method **MUST** return `Ok(s)` when and only when `nbytes` does
    /// not exceed `self.remainder()`, and `s.len()` must equal `nbytes`.
    fn consume(&mut self, nbytes: usize) -> DecodeResult<&[u8]>;

    /// Consumes `N` bytes and returns them in array-form
    fn consume_arr<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut ret = [0u8; N];
        ret.copy_from_slice(self.consume(N)?);
        Ok(ret)
    }

    /// Returns an error if any bytes remain unconsumed.
    fn ensure_consumed(&self) -> DecodeResult<()> {
        match self.remainder() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }

    #[inline]
    fn take_u8(&mut self) -> DecodeResult<u8> {
        self.consume_byte()
    }

    #[inline]
    fn take_i8(&mut self) -> DecodeResult<i8> {
        Ok(self.consume_byte()? as i8)
    }

    #[inline]
    fn take_u16(&mut self) -> DecodeResult<u16> {
        self.consume_arr::<2>().map(u16::from_le_bytes)
    }

    #[inline]
    fn take_i16(&mut self) -> DecodeResult<i16> {
        self.consume_arr::<2>().map(i16::from_le_bytes)
    }

    #[inline]
    fn take_u32(&mut self) -> DecodeResult<u32> {
        self.consume_arr::<4>().map(u32::from_le_bytes)
    }

    #[inline]
    fn take_i32(&mut self) -> DecodeResult<i32> {
        self.consume_arr::<4>().map(i32::from_le_bytes)
    }

    #[inline]
    fn take_u64(&mut self) -> DecodeResult<u64> {
        self.consume_arr::<8>().map(u64::from_le_bytes)
    }

    #[inline]
    fn take_i64(&mut self) -> DecodeResult<i64> {
        self.consume_arr::<8>().map(i64::from_le_bytes)
    }

    #[inline]
    fn take_f32(&mut self) -> DecodeResult<f32> {
        self.consume_arr::<4>().map(f32::from_le_bytes)
    }

    #[inline]
    fn take_f64(&mut self) -> DecodeResult<f64> {
        self.consume_arr::<8>().map(f64::from_le_bytes)
    }

    /// Consumes one byte as a boolean. Zero is `false`, every other value
    /// is `true`.
    #[inline]
    fn take_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.consume_byte()? != 0)
    }

    /// Consumes the presence byte of an optional value.
    #[inline]
    fn take_presence(&mut self) -> DecodeResult<bool> {
        self.take_bool()
    }

    /// Consumes an 8-byte zig-zag length prefix and returns the length.
    fn take_len(&mut self) -> DecodeResult<usize> {
        let len = unzigzag(self.take_u64()?);
        if len < 0 {
            return Err(DecodeError::NegativeLength(len));
        }
        usize::try_from(len).map_err(|_| DecodeError::LengthOverflow(len))
    }

    /// Consumes a length prefix followed by that many raw bytes.
    fn take_dynamic(&mut self) -> DecodeResult<Vec<u8>> {
        let len = self.take_len()?;
        Ok(self.consume(len)?.to_vec())
    }
}

/// Parser over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct SliceParser<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> SliceParser<'a> {
    #[must_use]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }
}

impl<'a> Parser for SliceParser<'a> {
    #[inline]
    fn view_len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    fn consume_byte(&mut self) -> DecodeResult<u8> {
        match self.buffer.get(self.offset) {
            Some(&b) => {
                self.offset += 1;
                Ok(b)
            }
            None => Err(DecodeError::UnexpectedEof {
                offset: self.offset,
                requested: 1,
                remaining: 0,
            }),
        }
    }

    fn consume(&mut self, nbytes: usize) -> DecodeResult<&[u8]> {
        let remaining = self.remainder();
        if nbytes > remaining {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset,
                requested: nbytes,
                remaining,
            });
        }
        let start = self.offset;
        self.offset += nbytes;
        Ok(&self.buffer[start..self.offset])
    }
}

/// Conversion from a byte container into a [`SliceParser`].
///
/// The conversions defined in this crate are all infallible; the `Result`
/// is kept so that callers can chain with `?` alongside decode calls.
pub trait TryIntoParser<'a> {
    fn try_into_parser(self) -> DecodeResult<SliceParser<'a>>;
}

impl<'a> TryIntoParser<'a> for &'a [u8] {
    fn try_into_parser(self) -> DecodeResult<SliceParser<'a>> {
        Ok(SliceParser::new(self))
    }
}

impl<'a> TryIntoParser<'a> for &'a Vec<u8> {
    fn try_into_parser(self) -> DecodeResult<SliceParser<'a>> {
        Ok(SliceParser::new(self.as_slice()))
    }
}

impl<'a, const N: usize> TryIntoParser<'a> for &'a [u8; N] {
    fn try_into_parser(self) -> DecodeResult<SliceParser<'a>> {
        Ok(SliceParser::new(self.as_slice()))
    }
}

impl<'a> TryIntoParser<'a> for &'a str {
    fn try_into_parser(self) -> DecodeResult<SliceParser<'a>> {
        Ok(SliceParser::new(self.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_reads() -> DecodeResult<()> {
        let mut p = (&[0x01u8, 0x02, 0xff, 0xff, 0xff, 0xff, 0x2a][..]).try_into_parser()?;
        assert_eq!(p.take_u16()?, 0x0201);
        assert_eq!(p.take_i32()?, -1);
        assert_eq!(p.take_u8()?, 42);
        assert_eq!(p.remainder(), 0);
        Ok(())
    }

    #[test]
    fn eof_leaves_state() {
        let mut p = SliceParser::new(&[1, 2, 3]);
        match p.take_u32() {
            Err(DecodeError::UnexpectedEof {
                offset: 0,
                requested: 4,
                remaining: 3,
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn nonzero_is_true() -> DecodeResult<()> {
        let mut p = SliceParser::new(&[0, 1, 7]);
        assert!(!p.take_bool()?);
        assert!(p.take_bool()?);
        assert!(p.take_presence()?);
        Ok(())
    }

    #[test]
    fn length_prefix() -> DecodeResult<()> {
        let mut p = SliceParser::new(&[6, 0, 0, 0, 0, 0, 0, 0, b'a', b'b', b'c']);
        assert_eq!(p.take_dynamic()?, b"abc");
        p.ensure_consumed()
    }

    #[test]
    fn negative_length_rejected() {
        let mut p = SliceParser::new(&[1, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(p.take_len(), Err(DecodeError::NegativeLength(-1))));
    }
}
