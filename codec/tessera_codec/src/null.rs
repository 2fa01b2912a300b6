//! The one-byte null marker preceding every nullable value.

use std::io::{Read, Write};

use crate::{Error, Primitive, Result};

/// The marker written for an absent value.
pub const NULL: u8 = 1;

/// The marker written when a payload follows.
pub const PRESENT: u8 = 0;

/// Writes the marker for `value` and returns `true` if it was null.
///
/// # Errors
///
/// Propagates the failure of the sink.
pub fn write_mark<T: ?Sized, W: Write + ?Sized>(
    sink: &mut W,
    value: Option<&T>,
) -> Result<bool> {
    let is_null = value.is_none();
    (if is_null { NULL } else { PRESENT }).write_to(sink)?;

    Ok(is_null)
}

/// Reads a marker and returns `true` if it says null.
///
/// Any non-zero byte counts as null.
///
/// # Errors
///
/// Returns [`Error::EndOfInput`] if the source is exhausted.
pub fn read_mark<R: Read + ?Sized>(source: &mut R) -> Result<bool> {
    Ok(u8::read_from(source)? != PRESENT)
}

/// Reads a marker and checks it against `allow_null`.
///
/// Returns `true` if the value is present and its payload follows.
///
/// # Errors
///
/// Returns [`Error::UnexpectedNull`] if the marker says null while
/// `allow_null` is `false`.
pub fn read_presence<R: Read + ?Sized>(
    source: &mut R,
    allow_null: bool,
) -> Result<bool> {
    if read_mark(source)? {
        if allow_null {
            Ok(false)
        } else {
            Err(Error::UnexpectedNull)
        }
    } else {
        Ok(true)
    }
}
