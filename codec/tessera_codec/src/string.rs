//! Length-prefixed modified UTF-8 text.
//!
//! The text is encoded unit by unit over its UTF-16 representation:
//!
//! | code unit            | bytes                          |
//! |----------------------|--------------------------------|
//! | `0x0001..=0x007F`    | `0xxxxxxx`                     |
//! | `0x0000`, `..=0x07FF`| `110xxxxx 10xxxxxx`            |
//! | `0x0800..=0xFFFF`    | `1110xxxx 10xxxxxx 10xxxxxx`   |
//!
//! Characters outside the basic multilingual plane are therefore written as
//! two three-byte surrogate sequences. The frame is `varint(byte_len)`
//! followed by the bytes.

use std::io::{Read, Write};

use crate::{error::MalformedString, varint, Error, Options, Result};

/// Returns the number of bytes `text` occupies once encoded, excluding the
/// length prefix.
#[must_use]
pub fn encoded_len(text: &str) -> usize {
    text.encode_utf16().map(unit_len).sum()
}

const fn unit_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007F => 1,
        0x0800.. => 3,
        _ => 2,
    }
}

/// Appends the modified UTF-8 encoding of `text` to `buffer`.
#[allow(clippy::cast_possible_truncation)]
pub fn encode(text: &str, buffer: &mut Vec<u8>) {
    buffer.reserve(encoded_len(text));

    for unit in text.encode_utf16() {
        match unit_len(unit) {
            1 => buffer.push(unit as u8),
            2 => buffer.extend_from_slice(&[
                0xC0 | ((unit >> 6) & 0x1F) as u8,
                0x80 | (unit & 0x3F) as u8,
            ]),
            _ => buffer.extend_from_slice(&[
                0xE0 | ((unit >> 12) & 0x0F) as u8,
                0x80 | ((unit >> 6) & 0x3F) as u8,
                0x80 | (unit & 0x3F) as u8,
            ]),
        }
    }
}

/// Decodes a complete modified UTF-8 payload.
///
/// # Errors
///
/// See [`MalformedString`] for the rejected inputs.
pub fn decode(bytes: &[u8]) -> std::result::Result<String, MalformedString> {
    let ascii_prefix = bytes.iter().take_while(|byte| **byte <= 0x7F).count();

    if ascii_prefix == bytes.len() {
        return String::from_utf8(bytes.to_vec())
            .map_err(|_| MalformedString::InvalidLead { offset: 0 });
    }

    let mut units = Vec::with_capacity(bytes.len());
    units.extend(bytes[..ascii_prefix].iter().copied().map(u16::from));

    let mut offset = ascii_prefix;

    while offset < bytes.len() {
        let lead = bytes[offset];

        match lead >> 4 {
            0x0..=0x7 => {
                units.push(u16::from(lead));
                offset += 1;
            }

            0xC | 0xD => {
                let [second] = continuation::<1>(bytes, offset)?;

                units.push((u16::from(lead & 0x1F) << 6) | u16::from(second));
                offset += 2;
            }

            0xE => {
                let [second, third] = continuation::<2>(bytes, offset)?;

                units.push(
                    (u16::from(lead & 0x0F) << 12)
                        | (u16::from(second) << 6)
                        | u16::from(third),
                );
                offset += 3;
            }

            _ => return Err(MalformedString::InvalidLead { offset }),
        }
    }

    String::from_utf16(&units).map_err(|_| MalformedString::UnpairedSurrogate)
}

/// Returns the payload bits of the `N` continuation bytes after `offset`.
fn continuation<const N: usize>(
    bytes: &[u8],
    offset: usize,
) -> std::result::Result<[u8; N], MalformedString> {
    if offset + N >= bytes.len() {
        return Err(MalformedString::Truncated { offset });
    }

    let mut payload = [0u8; N];

    for (index, slot) in payload.iter_mut().enumerate() {
        let byte = bytes[offset + 1 + index];

        if byte & 0xC0 != 0x80 {
            return Err(MalformedString::InvalidContinuation {
                offset: offset + 1 + index,
            });
        }

        *slot = byte & 0x3F;
    }

    Ok(payload)
}

/// Writes the string frame `varint(byte_len) bytes`.
///
/// # Errors
///
/// Returns [`Error::StringTooLong`] if the encoding exceeds `i32::MAX`
/// bytes, and propagates the failure of the sink.
pub fn write<W: Write + ?Sized>(sink: &mut W, text: &str) -> Result<()> {
    let mut buffer = Vec::new();
    encode(text, &mut buffer);

    let length = i32::try_from(buffer.len())
        .map_err(|_| Error::StringTooLong { length: buffer.len() })?;

    varint::write(sink, length)?;
    sink.write_all(&buffer)?;

    Ok(())
}

/// Reads a string frame written by [`write`].
///
/// At most [`Options::preallocation_limit()`] bytes are reserved up front, the
/// rest grows as bytes actually arrive.
///
/// # Errors
///
/// - [`Error::EndOfInput`] if fewer bytes than declared are available.
/// - [`Error::MalformedVarInt`] for a corrupt length prefix.
/// - [`Error::MalformedString`] for an invalid payload.
pub fn read<R: Read + ?Sized>(
    source: &mut R,
    options: &Options,
) -> Result<String> {
    let declared = varint::read::<i32, _>(source)?;
    let length = usize::try_from(declared).unwrap_or_default();

    if length == 0 {
        return Ok(String::new());
    }

    let mut buffer = Vec::with_capacity(options.capacity_for(length));
    Read::take(&mut *source, u64::from(declared.unsigned_abs()))
        .read_to_end(&mut buffer)?;

    if buffer.len() < length {
        return Err(Error::EndOfInput);
    }

    Ok(decode(&buffer)?)
}
