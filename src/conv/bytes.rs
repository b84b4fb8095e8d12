//! Raw byte buffers transcoded in a single bulk operation

use std::fmt::Write;

use super::target::{write_len, Target};
use super::{Decode, Encode, Prefixed};
use crate::parse::{DecodeResult, Parser};

/// Length-prefixed byte buffer
///
/// Has the same wire form as `Vec<u8>`, but is written with one
/// `push_all` and read with one `consume` instead of element by element.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct Bytes(pub Vec<u8>);

/// Formats a byte sequence as a lowercase hexadecimal string.
#[must_use]
pub fn hex_of_bytes(bytes: impl AsRef<[u8]>) -> String {
    let bytes = bytes.as_ref();
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // writing into a String cannot fail
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

impl std::fmt::Debug for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bytes(0x{})", hex_of_bytes(&self.0))
    }
}

impl Bytes {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Encode for Bytes {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.anticipate(8 + self.0.len());
        write_len(buf, self.0.len()) + buf.push_all(&self.0)
    }
}

impl Prefixed for Bytes {
    fn parse_body<P: Parser>(p: &mut P, len: usize) -> DecodeResult<Self> {
        Ok(Self(p.consume(len)?.to_vec()))
    }
}

impl Decode for Bytes {
    fn parse<P: Parser>(p: &mut P) -> DecodeResult<Self> {
        p.take_dynamic().map(Self)
    }
}
