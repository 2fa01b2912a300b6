//! Fixed-width encoding of the primitive types.
//!
//! Every primitive is written as its big-endian two's complement
//! representation with no framing overhead. Floating-point values travel as
//! their IEEE-754 bit pattern.

use std::io::{Read, Write};

use crate::{Error, Result};

/// A value with a fixed-width big-endian encoding.
pub trait Primitive: Copy + Sized + 'static {
    /// The number of bytes the encoding occupies.
    const WIDTH: usize;

    /// The name used in diagnostics.
    const NAME: &'static str;

    /// Writes exactly [`Self::WIDTH`] bytes.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink; `char` additionally rejects
    /// characters outside the basic multilingual plane.
    fn write_to<W: Write + ?Sized>(self, sink: &mut W) -> Result<()>;

    /// Reads exactly [`Self::WIDTH`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndOfInput`] if the source is exhausted before the
    /// full width is read.
    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self>;
}

macro_rules! implement_integer {
    ($($ty:ty),*) => {
        $(
            impl Primitive for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();
                const NAME: &'static str = stringify!($ty);

                fn write_to<W: Write + ?Sized>(self, sink: &mut W) -> Result<()> {
                    sink.write_all(&self.to_be_bytes())?;
                    Ok(())
                }

                fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self> {
                    let mut buffer = [0u8; std::mem::size_of::<$ty>()];
                    source.read_exact(&mut buffer)?;
                    Ok(Self::from_be_bytes(buffer))
                }
            }
        )*
    };
}

implement_integer!(u8, i8, i16, i32, i64);

impl Primitive for f32 {
    const WIDTH: usize = 4;
    const NAME: &'static str = "f32";

    fn write_to<W: Write + ?Sized>(self, sink: &mut W) -> Result<()> {
        sink.write_all(&self.to_bits().to_be_bytes())?;
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self> {
        let mut buffer = [0u8; 4];
        source.read_exact(&mut buffer)?;
        Ok(Self::from_bits(u32::from_be_bytes(buffer)))
    }
}

impl Primitive for f64 {
    const WIDTH: usize = 8;
    const NAME: &'static str = "f64";

    fn write_to<W: Write + ?Sized>(self, sink: &mut W) -> Result<()> {
        sink.write_all(&self.to_bits().to_be_bytes())?;
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self> {
        let mut buffer = [0u8; 8];
        source.read_exact(&mut buffer)?;
        Ok(Self::from_bits(u64::from_be_bytes(buffer)))
    }
}

impl Primitive for bool {
    const WIDTH: usize = 1;
    const NAME: &'static str = "bool";

    fn write_to<W: Write + ?Sized>(self, sink: &mut W) -> Result<()> {
        u8::from(self).write_to(sink)
    }

    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self> {
        Ok(u8::read_from(source)? != 0)
    }
}

/// `char` is a single UTF-16 code unit on the wire.
impl Primitive for char {
    const WIDTH: usize = 2;
    const NAME: &'static str = "char";

    fn write_to<W: Write + ?Sized>(self, sink: &mut W) -> Result<()> {
        let unit = u16::try_from(u32::from(self))
            .map_err(|_| Error::UnrepresentableChar { character: self })?;

        sink.write_all(&unit.to_be_bytes())?;
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(source: &mut R) -> Result<Self> {
        let mut buffer = [0u8; 2];
        source.read_exact(&mut buffer)?;

        let unit = u16::from_be_bytes(buffer);
        Self::from_u32(u32::from(unit)).ok_or(Error::MalformedChar { unit })
    }
}
