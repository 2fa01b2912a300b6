//! Variable-length encoding of non-negative integers.
//!
//! A value is split into groups of seven bits, low-order group first. Every
//! byte but the last has its high bit set. The format has no terminator of
//! its own: the only corruption check is the bound on the last byte a width
//! permits, e.g. the third byte of an `i16` can't exceed `0x01` since a
//! non-negative `i16` has at most 15 significant bits.

use std::io::{Read, Write};

use crate::{Error, Primitive, Result};

const PAYLOAD_MASK: u8 = 0x7F;
const CONTINUATION_BIT: u8 = 0x80;

/// An integer type with a varint encoding.
pub trait VarInt: Primitive {
    /// The maximum number of bytes of the encoding.
    const MAX_BYTES: usize;

    /// The largest value the byte at [`Self::MAX_BYTES`] may carry.
    const LAST_BYTE_MAX: u8;

    /// Returns the value as an unsigned integer or `None` if negative.
    fn to_unsigned(self) -> Option<u64>;

    /// Converts a decoded value back, `None` if it doesn't fit.
    fn from_unsigned(value: u64) -> Option<Self>;

    /// Widens the value for diagnostics.
    fn widen(self) -> i64;
}

macro_rules! implement_varint {
    ($($ty:ty => $max_bytes:literal, $last_byte_max:literal);* $(;)?) => {
        $(
            impl VarInt for $ty {
                const MAX_BYTES: usize = $max_bytes;
                const LAST_BYTE_MAX: u8 = $last_byte_max;

                fn to_unsigned(self) -> Option<u64> {
                    u64::try_from(self).ok()
                }

                fn from_unsigned(value: u64) -> Option<Self> {
                    Self::try_from(value).ok()
                }

                fn widen(self) -> i64 { i64::from(self) }
            }
        )*
    };
}

implement_varint! {
    i16 => 3, 0x01;
    i32 => 5, 0x07;
    i64 => 9, 0x7F;
}

/// Writes `value` using 1 to [`VarInt::MAX_BYTES`] bytes.
///
/// # Errors
///
/// Returns [`Error::NegativeVarInt`] if `value` is negative; nothing is
/// written in that case.
#[allow(clippy::cast_possible_truncation)]
pub fn write<V: VarInt, W: Write + ?Sized>(
    sink: &mut W,
    value: V,
) -> Result<()> {
    let mut remaining = value
        .to_unsigned()
        .ok_or(Error::NegativeVarInt { value: value.widen() })?;

    let mut buffer = [0u8; 10];
    let mut length = 0;

    while remaining > u64::from(PAYLOAD_MASK) {
        buffer[length] = (remaining as u8 & PAYLOAD_MASK) | CONTINUATION_BIT;
        remaining >>= 7;
        length += 1;
    }

    buffer[length] = remaining as u8;
    length += 1;

    sink.write_all(&buffer[..length])?;
    Ok(())
}

/// Reads a value written by [`write`].
///
/// # Errors
///
/// - [`Error::EndOfInput`] if the source ends before the last byte.
/// - [`Error::MalformedVarInt`] if the last permitted byte exceeds
///   [`VarInt::LAST_BYTE_MAX`].
pub fn read<V: VarInt, R: Read + ?Sized>(source: &mut R) -> Result<V> {
    let mut value = 0u64;

    for index in 0..V::MAX_BYTES {
        let byte = u8::read_from(source)?;
        let shift = 7 * index;

        if index == V::MAX_BYTES - 1 {
            if byte > V::LAST_BYTE_MAX {
                return Err(Error::MalformedVarInt { kind: V::NAME });
            }

            value |= u64::from(byte) << shift;
            break;
        }

        value |= u64::from(byte & PAYLOAD_MASK) << shift;

        if byte & CONTINUATION_BIT == 0 {
            break;
        }
    }

    V::from_unsigned(value).ok_or(Error::MalformedVarInt { kind: V::NAME })
}

/// Returns the number of bytes [`write`] emits for `value`, `None` for a
/// negative value.
#[must_use]
pub fn encoded_len<V: VarInt>(value: V) -> Option<usize> {
    let mut remaining = value.to_unsigned()?;
    let mut length = 1;

    while remaining > u64::from(PAYLOAD_MASK) {
        remaining >>= 7;
        length += 1;
    }

    Some(length)
}
