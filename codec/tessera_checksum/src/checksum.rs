//! Contains the definition of [`Checksum`] and its implementations.

/// A running 32-bit digest over a byte stream.
pub trait Checksum: Default {
    /// The name used in logs.
    const NAME: &'static str;

    /// Digests `bytes`.
    fn update(&mut self, bytes: &[u8]);

    /// Returns the digest of every byte seen since creation or the last
    /// [`Self::reset`].
    fn value(&self) -> u32;

    /// Restarts the digest from the empty input.
    fn reset(&mut self);
}

/// The Adler-32 checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adler32(adler2::Adler32);

impl Checksum for Adler32 {
    const NAME: &'static str = "adler32";

    fn update(&mut self, bytes: &[u8]) { self.0.write_slice(bytes); }

    fn value(&self) -> u32 { self.0.checksum() }

    fn reset(&mut self) { self.0 = adler2::Adler32::new(); }
}

/// The CRC-32 (IEEE) checksum.
#[derive(Debug, Clone, Default)]
pub struct Crc32(crc32fast::Hasher);

impl Checksum for Crc32 {
    const NAME: &'static str = "crc32";

    fn update(&mut self, bytes: &[u8]) { self.0.update(bytes); }

    fn value(&self) -> u32 { self.0.clone().finalize() }

    fn reset(&mut self) { self.0.reset(); }
}
