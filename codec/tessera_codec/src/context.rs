//! Contains the definition of [`Encoder`] and [`Decoder`], the byte streams
//! handed to [`BinarySerializer`]s.
//!
//! Both wrap a plain sink or source together with the [`Registry`] used to
//! resolve nested object types. They implement [`Write`] and [`Read`], so
//! every [`crate::DataOutput`] and [`crate::DataInput`] operation is
//! available on them.

use std::io::{self, Read, Write};

use crate::{
    null, string, BinarySerializer, DataOutput, Object, Options, Registry,
    Result,
};

/// The write side of a codec session.
pub struct Encoder<'a> {
    sink: &'a mut dyn Write,
    registry: &'a Registry,
}

impl std::fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder").field("registry", self.registry).finish()
    }
}

impl<'a> Encoder<'a> {
    /// Creates an encoder writing to `sink`.
    pub fn new(sink: &'a mut dyn Write, registry: &'a Registry) -> Self {
        Self { sink, registry }
    }

    /// Returns the registry used to resolve object serializers.
    #[must_use]
    pub const fn registry(&self) -> &'a Registry { self.registry }

    /// Writes a nullable value of a registered type.
    ///
    /// The serializer is only resolved when `value` is present.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Registry`] if no serializer is registered for
    /// `T`.
    pub fn write_object<T: ?Sized + 'static>(
        &mut self,
        value: Option<&T>,
    ) -> Result<()> {
        if let Some(value) = value {
            let serializer = self.registry.resolve::<T>()?;
            self.write_object_with(&*serializer, Some(value))
        } else {
            self.write_null_mark::<T>(None).map(|_| ())
        }
    }

    /// Writes a nullable value with an already resolved serializer.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the serializer.
    pub fn write_object_with<T: ?Sized>(
        &mut self,
        serializer: &dyn BinarySerializer<T>,
        value: Option<&T>,
    ) -> Result<()> {
        match value {
            Some(value) => {
                self.write_null_mark(Some(value))?;
                serializer.write(value, self)
            }
            None => self.write_null_mark::<T>(None).map(|_| ()),
        }
    }
}

impl Write for Encoder<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.sink.write(buf) }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.sink.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> { self.sink.flush() }
}

/// The read side of a codec session.
pub struct Decoder<'a> {
    source: &'a mut dyn Read,
    registry: &'a Registry,
    options: Options,
}

impl std::fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("registry", self.registry)
            .field("options", &self.options)
            .finish()
    }
}

impl<'a> Decoder<'a> {
    /// Creates a decoder reading from `source` with the default [`Options`].
    pub fn new(source: &'a mut dyn Read, registry: &'a Registry) -> Self {
        Self::with_options(source, registry, Options::default())
    }

    /// Creates a decoder reading from `source`.
    pub fn with_options(
        source: &'a mut dyn Read,
        registry: &'a Registry,
        options: Options,
    ) -> Self {
        Self { source, registry, options }
    }

    /// Returns the registry used to resolve object serializers.
    #[must_use]
    pub const fn registry(&self) -> &'a Registry { self.registry }

    /// Returns the options of this decoder.
    #[must_use]
    pub const fn options(&self) -> &Options { &self.options }

    /// Reads a string frame, honoring the decoder's [`Options`].
    ///
    /// # Errors
    ///
    /// See [`string::read`].
    pub fn read_utf(&mut self) -> Result<String> {
        let options = self.options;
        string::read(self, &options)
    }

    /// Reads a nullable string, honoring the decoder's [`Options`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnexpectedNull`] if the value is null and
    /// `allow_null` is `false`.
    pub fn read_string(&mut self, allow_null: bool) -> Result<Option<String>> {
        if null::read_presence(self, allow_null)? {
            self.read_utf().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads a nullable value of a registered sized type.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnexpectedNull`] if the value is null and
    ///   `allow_null` is `false`.
    /// - [`crate::Error::Registry`] if no serializer is registered for `T`.
    pub fn read_object<T: Object>(
        &mut self,
        allow_null: bool,
    ) -> Result<Option<T>> {
        Ok(self.read_boxed_object::<T>(allow_null)?.map(|boxed| *boxed))
    }

    /// Reads a nullable value of a registered type, which may be an
    /// interface.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnexpectedNull`] if the value is null and
    ///   `allow_null` is `false`.
    /// - [`crate::Error::Registry`] if no serializer is registered for `T`.
    pub fn read_boxed_object<T: ?Sized + 'static>(
        &mut self,
        allow_null: bool,
    ) -> Result<Option<Box<T>>> {
        if !null::read_presence(self, allow_null)? {
            return Ok(None);
        }

        let serializer = self.registry.resolve::<T>()?;
        serializer.read(self).map(Some)
    }

    /// Reads a nullable value with an already resolved serializer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnexpectedNull`] if the value is null and
    /// `allow_null` is `false`.
    pub fn read_object_with<T: ?Sized>(
        &mut self,
        serializer: &dyn BinarySerializer<T>,
        allow_null: bool,
    ) -> Result<Option<Box<T>>> {
        if null::read_presence(self, allow_null)? {
            serializer.read(self).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl Read for Decoder<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.source.read(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.source.read_exact(buf)
    }
}
