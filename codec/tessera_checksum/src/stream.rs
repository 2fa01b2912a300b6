//! Contains the definition of [`ChecksumWriter`] and [`ChecksumReader`].

use std::io::{self, Read, Write};

use tessera_codec::{Primitive, Result};

use crate::Checksum;

/// The number of bytes of a trailing signature.
pub const SIGNATURE_LEN: usize = i64::WIDTH;

/// Forwards writes to `W`, digesting every byte accepted by it.
#[derive(Debug, Clone, Default)]
pub struct ChecksumWriter<W, C> {
    inner: W,
    checksum: C,
}

impl<W, C: Checksum> ChecksumWriter<W, C> {
    /// Wraps `inner` with a fresh checksum.
    #[must_use]
    pub fn new(inner: W) -> Self { Self { inner, checksum: C::default() } }

    /// Returns the digest of every byte written so far.
    #[must_use]
    pub fn checksum(&self) -> u32 { self.checksum.value() }

    /// Restarts the digest without touching the inner stream.
    pub fn reset(&mut self) { self.checksum.reset(); }

    /// Returns a reference to the inner stream.
    #[must_use]
    pub const fn get_ref(&self) -> &W { &self.inner }

    /// Returns a mutable reference to the inner stream.
    ///
    /// Bytes written directly to it are not digested.
    pub fn get_mut(&mut self) -> &mut W { &mut self.inner }

    /// Unwraps the inner stream.
    #[must_use]
    pub fn into_inner(self) -> W { self.inner }
}

impl<W: Write, C: Checksum> ChecksumWriter<W, C> {
    /// Appends the current digest to the inner stream as a fixed-width
    /// 8-byte integer and returns it.
    ///
    /// The signature itself is not digested.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the inner stream.
    pub fn sign(&mut self) -> Result<u32> {
        let value = self.checksum.value();
        i64::from(value).write_to(&mut self.inner)?;

        log::debug!("signed stream with {} {value:#010x}", C::NAME);

        Ok(value)
    }
}

impl<W: Write, C: Checksum> Write for ChecksumWriter<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.checksum.update(&buf[..written]);

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> { self.inner.flush() }
}

/// Forwards reads from `R`, digesting every byte returned by it.
#[derive(Debug, Clone, Default)]
pub struct ChecksumReader<R, C> {
    inner: R,
    checksum: C,
}

impl<R, C: Checksum> ChecksumReader<R, C> {
    /// Wraps `inner` with a fresh checksum.
    #[must_use]
    pub fn new(inner: R) -> Self { Self { inner, checksum: C::default() } }

    /// Returns the digest of every byte read so far.
    #[must_use]
    pub fn checksum(&self) -> u32 { self.checksum.value() }

    /// Restarts the digest without touching the inner stream.
    pub fn reset(&mut self) { self.checksum.reset(); }

    /// Returns a reference to the inner stream.
    #[must_use]
    pub const fn get_ref(&self) -> &R { &self.inner }

    /// Returns a mutable reference to the inner stream.
    ///
    /// Bytes read directly from it are not digested.
    pub fn get_mut(&mut self) -> &mut R { &mut self.inner }

    /// Unwraps the inner stream.
    #[must_use]
    pub fn into_inner(self) -> R { self.inner }
}

impl<R: Read, C: Checksum> ChecksumReader<R, C> {
    /// Compares the digest of the bytes read so far with `expected`.
    ///
    /// With `None`, the expected value is the 8-byte signature that follows
    /// in the inner stream, as written by [`ChecksumWriter::sign`]; reading
    /// it doesn't affect the digest. A signature outside the `u32` range
    /// never matches.
    ///
    /// # Errors
    ///
    /// Returns [`tessera_codec::Error::EndOfInput`] if the signature is
    /// missing or truncated.
    pub fn verify(&mut self, expected: Option<u32>) -> Result<bool> {
        let actual = self.checksum.value();
        let expected = match expected {
            Some(expected) => i64::from(expected),
            None => i64::read_from(&mut self.inner)?,
        };

        let matches = expected == i64::from(actual);

        if matches {
            log::debug!("verified {} {actual:#010x}", C::NAME);
        } else {
            log::warn!(
                "{} mismatch: expected {expected:#010x}, computed {actual:#010x}",
                C::NAME
            );
        }

        Ok(matches)
    }
}

impl<R: Read, C: Checksum> Read for ChecksumReader<R, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.checksum.update(&buf[..read]);

        Ok(read)
    }
}
