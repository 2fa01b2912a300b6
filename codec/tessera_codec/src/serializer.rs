//! Contains the definition of [`BinarySerializer`] and [`Object`].

use std::any::Any;

use crate::{Decoder, Encoder, Result};

/// Encodes and decodes values of type `T`.
///
/// `T` is either a concrete type or an interface, i.e. a trait object type
/// such as `dyn Shape` whose trait extends [`Object`]. A serializer only
/// writes the payload of a value frame: null markers are the caller's
/// concern.
///
/// # Example
///
/// ```rust
/// use tessera_codec::{
///     BinarySerializer, DataInput, DataOutput, Decoder, Encoder, Registry,
///     Result,
/// };
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// struct PointSerializer;
///
/// impl BinarySerializer<Point> for PointSerializer {
///     fn write(&self, value: &Point, encoder: &mut Encoder) -> Result<()> {
///         encoder.write_i32(value.x)?;
///         encoder.write_i32(value.y)
///     }
///
///     fn read(&self, decoder: &mut Decoder) -> Result<Box<Point>> {
///         Ok(Box::new(Point { x: decoder.read_i32()?, y: decoder.read_i32()? }))
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.register::<Point>(PointSerializer);
///
/// let mut buffer = Vec::new();
/// Encoder::new(&mut buffer, &registry)
///     .write_object(Some(&Point { x: 1, y: 2 }))
///     .unwrap();
///
/// let mut source = buffer.as_slice();
/// let point = Decoder::new(&mut source, &registry)
///     .read_object::<Point>(false)
///     .unwrap();
///
/// assert_eq!(point, Some(Point { x: 1, y: 2 }));
/// ```
pub trait BinarySerializer<T: ?Sized>: Send + Sync {
    /// Writes the payload of `value`.
    ///
    /// # Errors
    ///
    /// Propagates any codec error raised while writing.
    fn write(&self, value: &T, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Reads a payload written by [`Self::write`].
    ///
    /// # Errors
    ///
    /// Propagates any codec error raised while reading.
    fn read(&self, decoder: &mut Decoder<'_>) -> Result<Box<T>>;
}

/// The root of every interface that can carry a registered serializer.
///
/// Implemented for every `'static` sized type; an interface trait opts in by
/// extending it (`trait Shape: Object {}`), which lets the registry recover
/// the concrete type behind a `Box<dyn Shape>`.
pub trait Object: Any + Send + Sync {
    /// Converts the boxed value into a `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Returns the name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> Object for T {
    fn into_any(self: Box<Self>) -> Box<dyn Any> { self }

    fn type_name(&self) -> &'static str { std::any::type_name::<T>() }
}
