//! Extension traits exposing the primitive, varint, null and string codecs on
//! every byte sink and source.

use std::io::{Read, Write};

use crate::{null, string, varint, Options, Primitive, Result, VarInt};

/// Write-side codec operations, implemented for every [`Write`].
pub trait DataOutput: Write {
    /// Writes `1` for `true` and `0` for `false`.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_bool(&mut self, value: bool) -> Result<()> {
        value.write_to(self)
    }

    /// Writes the character as a single big-endian UTF-16 code unit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnrepresentableChar`] for characters outside
    /// the basic multilingual plane.
    fn write_char(&mut self, value: char) -> Result<()> { value.write_to(self) }

    /// Writes a signed byte.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_i8(&mut self, value: i8) -> Result<()> { value.write_to(self) }

    /// Writes a 2-byte big-endian integer.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_i16(&mut self, value: i16) -> Result<()> { value.write_to(self) }

    /// Writes a 4-byte big-endian integer.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_i32(&mut self, value: i32) -> Result<()> { value.write_to(self) }

    /// Writes an 8-byte big-endian integer.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_i64(&mut self, value: i64) -> Result<()> { value.write_to(self) }

    /// Writes the bit pattern of a `f32` as a 4-byte integer.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_f32(&mut self, value: f32) -> Result<()> { value.write_to(self) }

    /// Writes the bit pattern of a `f64` as an 8-byte integer.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_f64(&mut self, value: f64) -> Result<()> { value.write_to(self) }

    /// Writes a non-negative `i16` in at most 3 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NegativeVarInt`] for a negative value.
    fn write_var_i16(&mut self, value: i16) -> Result<()> {
        varint::write(self, value)
    }

    /// Writes a non-negative `i32` in at most 5 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NegativeVarInt`] for a negative value.
    fn write_var_i32(&mut self, value: i32) -> Result<()> {
        varint::write(self, value)
    }

    /// Writes a non-negative `i64` in at most 9 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NegativeVarInt`] for a negative value.
    fn write_var_i64(&mut self, value: i64) -> Result<()> {
        varint::write(self, value)
    }

    /// Writes the null marker of `value`, returning `true` if it was null.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_null_mark<T: ?Sized>(&mut self, value: Option<&T>) -> Result<bool> {
        null::write_mark(self, value)
    }

    /// Writes a nullable primitive as a value frame.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the sink.
    fn write_nullable<P: Primitive>(&mut self, value: Option<P>) -> Result<()> {
        if let Some(value) = value {
            self.write_null_mark(Some(&value))?;
            value.write_to(self)
        } else {
            self.write_null_mark::<P>(None).map(|_| ())
        }
    }

    /// Writes a nullable integer as a value frame with a varint payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NegativeVarInt`] for a negative value.
    fn write_var_nullable<V: VarInt>(&mut self, value: Option<V>) -> Result<()> {
        if let Some(value) = value {
            if value.to_unsigned().is_none() {
                return Err(crate::Error::NegativeVarInt {
                    value: value.widen(),
                });
            }

            self.write_null_mark(Some(&value))?;
            varint::write(self, value)
        } else {
            self.write_null_mark::<V>(None).map(|_| ())
        }
    }

    /// Writes a string frame without a null marker.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StringTooLong`] if the encoding exceeds
    /// `i32::MAX` bytes.
    fn write_utf(&mut self, value: &str) -> Result<()> {
        string::write(self, value)
    }

    /// Writes a nullable string: null marker followed by the string frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StringTooLong`] if the encoding exceeds
    /// `i32::MAX` bytes.
    fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        if !self.write_null_mark(value)? {
            if let Some(value) = value {
                string::write(self, value)?;
            }
        }

        Ok(())
    }
}

impl<W: Write + ?Sized> DataOutput for W {}

/// Read-side codec operations, implemented for every [`Read`].
pub trait DataInput: Read {
    /// Reads a byte, `true` iff non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_bool(&mut self) -> Result<bool> { bool::read_from(self) }

    /// Reads a UTF-16 code unit as a `char`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedChar`] for a lone surrogate.
    fn read_char(&mut self) -> Result<char> { char::read_from(self) }

    /// Reads a signed byte.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_i8(&mut self) -> Result<i8> { i8::read_from(self) }

    /// Reads a 2-byte big-endian integer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_i16(&mut self) -> Result<i16> { i16::read_from(self) }

    /// Reads a 4-byte big-endian integer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_i32(&mut self) -> Result<i32> { i32::read_from(self) }

    /// Reads an 8-byte big-endian integer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_i64(&mut self) -> Result<i64> { i64::read_from(self) }

    /// Reads a `f32` from its bit pattern.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_f32(&mut self) -> Result<f32> { f32::read_from(self) }

    /// Reads a `f64` from its bit pattern.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_f64(&mut self) -> Result<f64> { f64::read_from(self) }

    /// Reads a varint `i16`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedVarInt`] if the third byte exceeds
    /// `0x01`.
    fn read_var_i16(&mut self) -> Result<i16> { varint::read(self) }

    /// Reads a varint `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedVarInt`] if the fifth byte exceeds
    /// `0x07`.
    fn read_var_i32(&mut self) -> Result<i32> { varint::read(self) }

    /// Reads a varint `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedVarInt`] if the ninth byte exceeds
    /// `0x7F`.
    fn read_var_i64(&mut self) -> Result<i64> { varint::read(self) }

    /// Reads a null marker, `true` if it says null.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EndOfInput`] if the source is exhausted.
    fn read_null_mark(&mut self) -> Result<bool> { null::read_mark(self) }

    /// Reads a nullable primitive written by
    /// [`DataOutput::write_nullable`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnexpectedNull`] if the value is null and
    /// `allow_null` is `false`.
    fn read_nullable<P: Primitive>(
        &mut self,
        allow_null: bool,
    ) -> Result<Option<P>> {
        if null::read_presence(self, allow_null)? {
            P::read_from(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads a nullable varint written by
    /// [`DataOutput::write_var_nullable`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnexpectedNull`] if the value is null and
    /// `allow_null` is `false`.
    fn read_var_nullable<V: VarInt>(
        &mut self,
        allow_null: bool,
    ) -> Result<Option<V>> {
        if null::read_presence(self, allow_null)? {
            varint::read(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads a string frame without a null marker.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedString`] for an invalid payload.
    fn read_utf(&mut self) -> Result<String> {
        string::read(self, &Options::default())
    }

    /// Reads a nullable string written by [`DataOutput::write_string`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnexpectedNull`] if the value is null and
    /// `allow_null` is `false`.
    fn read_string(&mut self, allow_null: bool) -> Result<Option<String>> {
        if null::read_presence(self, allow_null)? {
            self.read_utf().map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<R: Read + ?Sized> DataInput for R {}
