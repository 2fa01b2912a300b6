//! Element codecs: how a single element, key or value of a container is
//! framed.
//!
//! [`Fixed`], [`VarLen`], [`Utf`], [`Registered`] and [`Polymorphic`] write
//! the bare payload. [`Required`] and [`Nullable`] wrap another codec into a
//! value frame; they are the key and value nullability axes of a container.

use std::fmt::Debug;

use crate::{
    null, registry::SharedSerializer, string, varint, DataOutput, Decoder,
    Encoder, Primitive, Registry, Result, VarInt,
};

/// Writes and reads one element of a container.
pub trait Element<T> {
    /// Writes `value`.
    ///
    /// # Errors
    ///
    /// Propagates any codec error raised while writing.
    fn write(&self, value: &T, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Reads a value written by [`Self::write`].
    ///
    /// # Errors
    ///
    /// Propagates any codec error raised while reading.
    fn read(&self, decoder: &mut Decoder<'_>) -> Result<T>;
}

/// The fixed-width encoding of a [`Primitive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed;

impl<P: Primitive> Element<P> for Fixed {
    fn write(&self, value: &P, encoder: &mut Encoder<'_>) -> Result<()> {
        value.write_to(encoder)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<P> {
        P::read_from(decoder)
    }
}

/// The varint encoding of a non-negative [`VarInt`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarLen;

impl<V: VarInt> Element<V> for VarLen {
    fn write(&self, value: &V, encoder: &mut Encoder<'_>) -> Result<()> {
        varint::write(encoder, *value)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<V> {
        varint::read(decoder)
    }
}

/// The string frame of a [`String`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Utf;

impl Element<String> for Utf {
    fn write(&self, value: &String, encoder: &mut Encoder<'_>) -> Result<()> {
        string::write(encoder, value)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<String> {
        decoder.read_utf()
    }
}

/// A value frame around `E`; a null frame fails the read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Required<E>(pub E);

impl<T, E: Element<T>> Element<T> for Required<E> {
    fn write(&self, value: &T, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.write_null_mark(Some(value))?;
        self.0.write(value, encoder)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<T> {
        null::read_presence(decoder, false)?;
        self.0.read(decoder)
    }
}

/// A value frame around `E` that accepts null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nullable<E>(pub E);

impl<T, E: Element<T>> Element<Option<T>> for Nullable<E> {
    fn write(
        &self,
        value: &Option<T>,
        encoder: &mut Encoder<'_>,
    ) -> Result<()> {
        match value {
            Some(value) => {
                encoder.write_null_mark(Some(value))?;
                self.0.write(value, encoder)
            }
            None => encoder.write_null_mark::<T>(None).map(|_| ()),
        }
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<Option<T>> {
        if null::read_presence(decoder, true)? {
            self.0.read(decoder).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// The payload of a sized type, written by its registered serializer.
pub struct Registered<T> {
    serializer: SharedSerializer<T>,
}

impl<T> Clone for Registered<T> {
    fn clone(&self) -> Self { Self { serializer: self.serializer.clone() } }
}

impl<T> Debug for Registered<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registered")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Registered<T> {
    /// Resolves the serializer of `T` once, to be reused for every element.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Registry`] if `T` can't be resolved.
    pub fn resolve(registry: &Registry) -> Result<Self> {
        Ok(Self { serializer: registry.resolve::<T>()? })
    }
}

impl<T> Registered<T> {
    /// Wraps an explicit serializer.
    #[must_use]
    pub const fn new(serializer: SharedSerializer<T>) -> Self {
        Self { serializer }
    }
}

impl<T> Element<T> for Registered<T> {
    fn write(&self, value: &T, encoder: &mut Encoder<'_>) -> Result<()> {
        self.serializer.write(value, encoder)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<T> {
        self.serializer.read(decoder).map(|value| *value)
    }
}

/// The payload of a boxed value of a possibly unsized type, typically an
/// interface such as `dyn Shape`.
pub struct Polymorphic<T: ?Sized> {
    serializer: SharedSerializer<T>,
}

impl<T: ?Sized> Clone for Polymorphic<T> {
    fn clone(&self) -> Self { Self { serializer: self.serializer.clone() } }
}

impl<T: ?Sized> Debug for Polymorphic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polymorphic")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized + 'static> Polymorphic<T> {
    /// Resolves the serializer of `T` once, to be reused for every element.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Registry`] if `T` can't be resolved.
    pub fn resolve(registry: &Registry) -> Result<Self> {
        Ok(Self { serializer: registry.resolve::<T>()? })
    }
}

impl<T: ?Sized> Element<Box<T>> for Polymorphic<T> {
    fn write(&self, value: &Box<T>, encoder: &mut Encoder<'_>) -> Result<()> {
        self.serializer.write(value, encoder)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<Box<T>> {
        self.serializer.read(decoder)
    }
}
