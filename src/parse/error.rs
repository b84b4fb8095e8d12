//! Error types used to report failure during decoding
//!
//! Every fallible operation reachable from [`Parser`](super::Parser) or from a
//! [`Decode`](crate::conv::Decode) implementation reports a [`DecodeError`].
//! The variants fall into two groups: those arising from the shape of the
//! input (truncation, malformed length prefixes, invalid UTF-8, leftover
//! bytes) and those arising from a field constraint rejecting an otherwise
//! well-formed value.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Enumeration over all errors that may be returned by a decode call.
///
/// Any error is terminal for the decode it came from; callers must treat
/// partially consumed input as undefined.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input ran out while reading a fixed-size value, a length prefix or a
    /// length-prefixed body.
    #[error("unexpected end of input: requested {requested} bytes at offset {offset}, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        requested: usize,
        remaining: usize,
    },
    /// A length prefix decoded to a negative length.
    #[error("length prefix decodes to negative length {0}")]
    NegativeLength(i64),
    /// A length prefix decoded to a value that does not fit the platform `usize`.
    #[error("length prefix {0} exceeds the addressable range")]
    LengthOverflow(i64),
    /// String contents were not valid UTF-8.
    #[error("invalid utf-8 in string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    /// An 8-byte native integer does not fit the platform word.
    #[error("native integer {0} does not fit the platform word size")]
    NativeOverflow(i128),
    /// A field constraint rejected a decoded value or length.
    #[error("{description}")]
    ConstraintViolation { field: String, description: String },
    /// Top-level decode finished with unconsumed input.
    #[error("{0} trailing bytes left after decoding")]
    TrailingBytes(usize),
}

impl DecodeError {
    /// Constructs a [`DecodeError::ConstraintViolation`] for `field`.
    pub fn violation(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            field: field.into(),
            description: description.into(),
        }
    }

    /// Returns the name of the offending field if this is a constraint violation.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ConstraintViolation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

/// Type alias for the result of any decoding operation.
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_displays_description() {
        let err = DecodeError::violation("S", "field 'S' has a maximum length of 5");
        assert_eq!(err.to_string(), "field 'S' has a maximum length of 5");
        assert_eq!(err.field(), Some("S"));
        assert!(err.is_violation());
    }

    #[test]
    fn eof_mentions_offset() {
        let err = DecodeError::UnexpectedEof {
            offset: 3,
            requested: 8,
            remaining: 1,
        };
        assert!(err.to_string().contains("offset 3"));
        assert_eq!(err.field(), None);
    }
}
