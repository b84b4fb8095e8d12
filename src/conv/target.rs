//! Byte sinks for serialization
//!
//! [`Target`] is the write-side dual of [`Parser`](crate::parse::Parser):
//! every `Encode` implementation and every compiled encode procedure writes
//! through it. Besides `Vec<u8>`, two further sinks are provided:
//! [`ByteCounter`], which discards bytes and only counts them, and
//! [`WriteTarget`], which forwards to an arbitrary [`std::io::Write`] and
//! latches the first I/O failure so that it can be reported after the fact.

use std::io::Write;

/// Marker trait for byte-oriented buffers with incremental append operations
///
/// In most ways, it is convenient to think of `Target` as an analogous trait to
/// [`std::io::Write`]. The principal difference between the two is the fact
/// that the `push_XXX` methods on `Target` are infallible and total (as opposed
/// to partial); the `usize` they return is used only for book-keeping on the
/// caller side.
///
/// Sinks that can genuinely fail (see [`WriteTarget`]) must record the failure
/// internally rather than surfacing it through the push methods.
pub trait Target {
    /// Hints that at least `extra` more bytes are about to be written.
    ///
    /// For many implementors, this may simply be a no-op.
    fn anticipate(&mut self, extra: usize);

    /// Appends a single byte. The return value must be `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends the bytes in a known-length array to a Target object.
    ///
    /// The operational semantics of this method should be indistinguishable from repeated
    /// calls to `push_one` over every element of the array in order:
    ///
    /// ```ignore
    /// x.push_many(*b"Rust") === x.push_one(b'R') + x.push_one(b'u') + x.push_one(b's') + x.push_one(b't')
    /// ```
    ///
    /// The return value must be `N`.
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends the bytes in an arbitrary-length byte-slice in a single bulk
    /// operation. The return value must be the length of the slice.
    fn push_all(&mut self, buf: &[u8]) -> usize;
}

/// Useful alias for `std::io::Sink` that is used to count the number of
/// bytes required to serialize a value, without performing any memory
/// operations.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}

/// `Target` adapter over any [`std::io::Write`]
///
/// Once a write fails, every later push is skipped and the error is kept
/// until [`finish`](WriteTarget::finish) hands it back.
#[derive(Debug)]
pub struct WriteTarget<W: Write> {
    inner: W,
    error: Option<std::io::Error>,
}

impl<W: Write> WriteTarget<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    fn write_bytes(&mut self, buf: &[u8]) {
        if self.error.is_none() {
            if let Err(err) = self.inner.write_all(buf) {
                self.error = Some(err);
            }
        }
    }

    /// Flushes the underlying writer and returns it, or the first error
    /// encountered by any write.
    pub fn finish(mut self) -> std::io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Target for WriteTarget<W> {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    fn push_one(&mut self, b: u8) -> usize {
        self.write_bytes(&[b]);
        1
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.write_bytes(&arr);
        N
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.write_bytes(buf);
        buf.len()
    }
}

/// Folds a length into the sign-reserved zig-zag form used by every
/// length prefix on the wire.
#[inline]
#[must_use]
pub const fn zigzag(len: i64) -> u64 {
    ((len << 1) ^ (len >> 63)) as u64
}

/// Inverse of [`zigzag`].
#[inline]
#[must_use]
pub const fn unzigzag(ux: u64) -> i64 {
    let x = (ux >> 1) as i64;
    if ux & 1 != 0 {
        !x
    } else {
        x
    }
}

/// Writes the 8-byte little-endian zig-zag length prefix for `len`.
#[inline]
pub fn write_len<U: Target + ?Sized>(buf: &mut U, len: usize) -> usize {
    buf.push_many(zigzag(len as i64).to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_folds_sign() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(3), 6);
        assert_eq!(unzigzag(zigzag(i64::MAX)), i64::MAX);
        assert_eq!(unzigzag(zigzag(i64::MIN)), i64::MIN);
    }

    #[test]
    fn length_prefix_layout() {
        let mut buf = Vec::new();
        assert_eq!(write_len(&mut buf, 3), 8);
        assert_eq!(buf, [6, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn counter_matches_vec() {
        let mut counter: ByteCounter = std::io::sink();
        let mut vec = Vec::new();
        let n = counter.push_all(b"abc") + counter.push_many([1, 2]);
        let m = vec.push_all(b"abc") + vec.push_many([1, 2]);
        assert_eq!(n, m);
        assert_eq!(vec.len(), n);
    }

    #[derive(Debug)]
    struct Full;

    impl Write for Full {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_target_latches_error() {
        let mut tgt = WriteTarget::new(Full);
        tgt.write_bytes(b"x");
        tgt.write_bytes(b"y");
        let err = tgt.finish().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::WriteZero);
    }
}
