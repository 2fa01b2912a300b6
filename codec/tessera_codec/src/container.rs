//! Container framing for arrays, lists, sets, maps and multimaps.
//!
//! Every container is written as its null marker, a varint element count and
//! then the element frames. Primitive arrays carry raw fixed-width elements;
//! every other container frames each element, key and value with an
//! [`Element`] codec, where [`Required`] and [`Nullable`] select whether a
//! null element is accepted.
//!
//! Readers take an optional buffer to fill. It is reused only when its size
//! matches the incoming count and the result tells which happened through
//! [`Filled::reuse`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use tessera_codec::{
//!     container::{self, Fixed, Nullable, Required, Utf},
//!     Decoder, Encoder, Registry,
//! };
//!
//! let registry = Registry::new();
//! let ages = BTreeMap::from([
//!     ("alice".to_owned(), Some(31)),
//!     ("bob".to_owned(), None),
//! ]);
//!
//! let mut buffer = Vec::new();
//! let mut encoder = Encoder::new(&mut buffer, &registry);
//! container::write_map(
//!     &mut encoder,
//!     Some(&ages),
//!     &Required(Utf),
//!     &Nullable(Fixed),
//! )
//! .unwrap();
//!
//! let mut source = buffer.as_slice();
//! let mut decoder = Decoder::new(&mut source, &registry);
//! let read = container::read_map::<BTreeMap<String, Option<i32>>, _, _>(
//!     &mut decoder,
//!     false,
//!     None,
//!     &Required(Utf),
//!     &Nullable(Fixed),
//! )
//! .unwrap()
//! .unwrap();
//!
//! assert_eq!(read.value, ages);
//! ```

use std::io::{Read, Write};

use crate::{
    null, varint, DataOutput, Decoder, Encoder, Error, Options, Primitive,
    Result,
};

pub mod collection;
pub mod element;

pub use collection::{Collection, Map, Multimap};
pub use element::{
    Element, Fixed, Nullable, Polymorphic, Registered, Required, Utf, VarLen,
};

/// Tells whether a reader filled the caller's buffer or a new allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reuse {
    /// The supplied buffer was cleared and filled.
    Reused,

    /// A new container was allocated; any supplied buffer was dropped.
    Allocated,
}

/// A container read from the wire, dereferencing to the container.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    derive_more::Deref,
    derive_more::DerefMut,
)]
pub struct Filled<C> {
    /// The container.
    #[deref]
    #[deref_mut]
    pub value: C,

    /// Whether `value` is the caller's buffer.
    pub reuse: Reuse,
}

impl<C> Filled<C> {
    /// Returns `true` if the caller's buffer was reused.
    #[must_use]
    pub fn is_reused(&self) -> bool { self.reuse == Reuse::Reused }

    /// Unwraps the container.
    #[must_use]
    pub fn into_value(self) -> C { self.value }
}

/// Writes the element count of a container.
///
/// # Errors
///
/// Returns [`Error::CountOverflow`] if `count` exceeds `i32::MAX`.
pub fn write_count<W: Write + ?Sized>(
    sink: &mut W,
    count: usize,
) -> Result<()> {
    let count =
        i32::try_from(count).map_err(|_| Error::CountOverflow { count })?;
    varint::write(sink, count)
}

/// Reads the element count of a container.
///
/// # Errors
///
/// Returns [`Error::MalformedVarInt`] if the count is not a valid varint.
pub fn read_count<R: Read + ?Sized>(source: &mut R) -> Result<usize> {
    let count: i32 = varint::read(source)?;
    let kind = <i32 as Primitive>::NAME;

    usize::try_from(count).map_err(|_| Error::MalformedVarInt { kind })
}

fn null_container<W: Write + ?Sized>(sink: &mut W) -> Result<()> {
    sink.write_null_mark::<()>(None).map(|_| ())
}

/// Writes a nullable array of primitives with raw, unmarked elements.
///
/// # Errors
///
/// Returns [`Error::CountOverflow`] if the array is too long to frame.
pub fn write_array<P: Primitive, W: Write + ?Sized>(
    sink: &mut W,
    array: Option<&[P]>,
) -> Result<()> {
    let Some(array) = array else {
        return null_container(sink);
    };

    sink.write_null_mark(Some(array))?;
    write_count(sink, array.len())?;

    for element in array {
        element.write_to(sink)?;
    }

    Ok(())
}

/// Reads an array written by [`write_array`].
///
/// `buffer` is reused only if its length equals the incoming count; an empty
/// array never allocates.
///
/// # Errors
///
/// - [`Error::UnexpectedNull`] if the array is null and `allow_null` is
///   `false`.
/// - [`Error::EndOfInput`] if the source ends before the last element.
pub fn read_array<P: Primitive, R: Read + ?Sized>(
    source: &mut R,
    allow_null: bool,
    buffer: Option<Vec<P>>,
    options: &Options,
) -> Result<Option<Filled<Vec<P>>>> {
    if !null::read_presence(source, allow_null)? {
        return Ok(None);
    }

    let count = read_count(source)?;

    if let Some(mut buffer) = buffer.filter(|x| x.len() == count) {
        for slot in &mut buffer {
            *slot = P::read_from(source)?;
        }

        return Ok(Some(Filled { value: buffer, reuse: Reuse::Reused }));
    }

    let mut value = Vec::with_capacity(options.capacity_for(count));
    for _ in 0..count {
        value.push(P::read_from(source)?);
    }

    Ok(Some(Filled { value, reuse: Reuse::Allocated }))
}

/// Writes a nullable byte array in one bulk write.
///
/// The frame is identical to [`write_array`] over `u8`.
///
/// # Errors
///
/// Returns [`Error::CountOverflow`] if the array is too long to frame.
pub fn write_byte_array<W: Write + ?Sized>(
    sink: &mut W,
    bytes: Option<&[u8]>,
) -> Result<()> {
    let Some(bytes) = bytes else {
        return null_container(sink);
    };

    sink.write_null_mark(Some(bytes))?;
    write_count(sink, bytes.len())?;
    sink.write_all(bytes)?;

    Ok(())
}

/// Reads a byte array in one bulk read, reusing `buffer` under the same rule
/// as [`read_array`].
///
/// # Errors
///
/// - [`Error::UnexpectedNull`] if the array is null and `allow_null` is
///   `false`.
/// - [`Error::EndOfInput`] if the source holds fewer bytes than declared.
pub fn read_byte_array<R: Read + ?Sized>(
    source: &mut R,
    allow_null: bool,
    buffer: Option<Vec<u8>>,
    options: &Options,
) -> Result<Option<Filled<Vec<u8>>>> {
    if !null::read_presence(source, allow_null)? {
        return Ok(None);
    }

    let count = read_count(source)?;

    if let Some(mut buffer) = buffer.filter(|x| x.len() == count) {
        source.read_exact(&mut buffer)?;

        return Ok(Some(Filled { value: buffer, reuse: Reuse::Reused }));
    }

    let limit =
        u64::try_from(count).map_err(|_| Error::CountOverflow { count })?;
    let mut value = Vec::with_capacity(options.capacity_for(count));
    Read::take(&mut *source, limit).read_to_end(&mut value)?;

    if value.len() != count {
        return Err(Error::EndOfInput);
    }

    Ok(Some(Filled { value, reuse: Reuse::Allocated }))
}

fn write_items<'i, T: 'i, E: Element<T>>(
    encoder: &mut Encoder<'_>,
    count: usize,
    items: impl Iterator<Item = &'i T>,
    element: &E,
) -> Result<()> {
    encoder.write_null_mark(Some(&count))?;
    write_count(encoder, count)?;

    for item in items {
        element.write(item, encoder)?;
    }

    Ok(())
}

/// Writes a nullable list from a slice.
///
/// # Errors
///
/// Propagates the failure of the element codec.
pub fn write_list<T, E: Element<T>>(
    encoder: &mut Encoder<'_>,
    list: Option<&[T]>,
    element: &E,
) -> Result<()> {
    match list {
        Some(list) => write_items(encoder, list.len(), list.iter(), element),
        None => null_container(encoder),
    }
}

/// Writes a nullable list or set.
///
/// # Errors
///
/// Propagates the failure of the element codec.
pub fn write_collection<C: Collection, E: Element<C::Item>>(
    encoder: &mut Encoder<'_>,
    collection: Option<&C>,
    element: &E,
) -> Result<()> {
    match collection {
        Some(collection) => {
            write_items(encoder, collection.len(), collection.items(), element)
        }
        None => null_container(encoder),
    }
}

/// Clears `buffer` if it holds exactly `count` elements, otherwise allocates
/// a new container sized for `count`.
fn prepare<C: Default>(
    decoder: &Decoder<'_>,
    buffer: Option<C>,
    count: usize,
    len: impl Fn(&C) -> usize,
    clear: impl FnOnce(&mut C),
    reserve: impl FnOnce(&mut C, usize),
) -> Filled<C> {
    if let Some(mut value) = buffer.filter(|x| len(x) == count) {
        clear(&mut value);
        Filled { value, reuse: Reuse::Reused }
    } else {
        let mut value = C::default();
        reserve(&mut value, decoder.options().capacity_for(count));
        Filled { value, reuse: Reuse::Allocated }
    }
}

fn read_collection_body<C: Collection, E: Element<C::Item>>(
    decoder: &mut Decoder<'_>,
    buffer: Option<C>,
    element: &E,
) -> Result<Filled<C>> {
    let count = read_count(decoder)?;
    let mut filled =
        prepare(decoder, buffer, count, C::len, C::clear, C::reserve);

    for _ in 0..count {
        filled.value.insert(element.read(decoder)?);
    }

    Ok(filled)
}

/// Reads a list or set written by [`write_collection`] or [`write_list`].
///
/// A supplied `buffer` is cleared and reused only if it holds exactly as
/// many elements as the incoming list.
///
/// # Errors
///
/// - [`Error::UnexpectedNull`] if the container is null and `allow_null` is
///   `false`, or if an element is null and `element` rejects null.
/// - Any failure of the element codec.
pub fn read_collection<C: Collection, E: Element<C::Item>>(
    decoder: &mut Decoder<'_>,
    allow_null: bool,
    buffer: Option<C>,
    element: &E,
) -> Result<Option<Filled<C>>> {
    if null::read_presence(decoder, allow_null)? {
        read_collection_body(decoder, buffer, element).map(Some)
    } else {
        Ok(None)
    }
}

/// Reads a list into a `Vec`; see [`read_collection`].
///
/// # Errors
///
/// See [`read_collection`].
pub fn read_list<T, E: Element<T>>(
    decoder: &mut Decoder<'_>,
    allow_null: bool,
    buffer: Option<Vec<T>>,
    element: &E,
) -> Result<Option<Filled<Vec<T>>>> {
    read_collection(decoder, allow_null, buffer, element)
}

fn write_pairs<'i, K: 'i, V: 'i>(
    encoder: &mut Encoder<'_>,
    count: usize,
    pairs: impl Iterator<Item = (&'i K, &'i V)>,
    key: &impl Element<K>,
    value: &impl Element<V>,
) -> Result<()> {
    encoder.write_null_mark(Some(&count))?;
    write_count(encoder, count)?;

    for (k, v) in pairs {
        key.write(k, encoder)?;
        value.write(v, encoder)?;
    }

    Ok(())
}

/// Writes a nullable map as alternating key and value frames.
///
/// # Errors
///
/// Propagates the failure of the key or value codec.
pub fn write_map<M: Map, K: Element<M::Key>, V: Element<M::Value>>(
    encoder: &mut Encoder<'_>,
    map: Option<&M>,
    key: &K,
    value: &V,
) -> Result<()> {
    match map {
        Some(map) => write_pairs(encoder, map.len(), map.entries(), key, value),
        None => null_container(encoder),
    }
}

fn read_map_body<M: Map, K: Element<M::Key>, V: Element<M::Value>>(
    decoder: &mut Decoder<'_>,
    buffer: Option<M>,
    key: &K,
    value: &V,
) -> Result<Filled<M>> {
    let count = read_count(decoder)?;
    let mut filled =
        prepare(decoder, buffer, count, M::len, M::clear, M::reserve);

    for _ in 0..count {
        let k = key.read(decoder)?;
        let v = value.read(decoder)?;
        filled.value.insert(k, v);
    }

    Ok(filled)
}

/// Reads a map written by [`write_map`].
///
/// A supplied `buffer` is reused under the same rule as [`read_collection`].
/// Later entries replace earlier ones with an equal key.
///
/// # Errors
///
/// - [`Error::UnexpectedNull`] if the map is null and `allow_null` is
///   `false`, or if a key or value is null and its codec rejects null.
/// - Any failure of the key or value codec.
pub fn read_map<M: Map, K: Element<M::Key>, V: Element<M::Value>>(
    decoder: &mut Decoder<'_>,
    allow_null: bool,
    buffer: Option<M>,
    key: &K,
    value: &V,
) -> Result<Option<Filled<M>>> {
    if null::read_presence(decoder, allow_null)? {
        read_map_body(decoder, buffer, key, value).map(Some)
    } else {
        Ok(None)
    }
}

/// Writes a nullable multimap, one key frame and one value frame per pair.
///
/// # Errors
///
/// Propagates the failure of the key or value codec.
pub fn write_multimap<M: Multimap, K: Element<M::Key>, V: Element<M::Value>>(
    encoder: &mut Encoder<'_>,
    multimap: Option<&M>,
    key: &K,
    value: &V,
) -> Result<()> {
    match multimap {
        Some(multimap) => write_pairs(
            encoder,
            multimap.pair_count(),
            multimap.pairs(),
            key,
            value,
        ),
        None => null_container(encoder),
    }
}

/// Reads a multimap written by [`write_multimap`], grouping the values of
/// equal keys in wire order.
///
/// A supplied `buffer` is reused only if it holds exactly as many pairs as
/// the incoming multimap.
///
/// # Errors
///
/// See [`read_map`].
pub fn read_multimap<M: Multimap, K: Element<M::Key>, V: Element<M::Value>>(
    decoder: &mut Decoder<'_>,
    allow_null: bool,
    buffer: Option<M>,
    key: &K,
    value: &V,
) -> Result<Option<Filled<M>>> {
    if !null::read_presence(decoder, allow_null)? {
        return Ok(None);
    }

    let count = read_count(decoder)?;
    let mut filled = prepare(
        decoder,
        buffer,
        count,
        M::pair_count,
        M::clear,
        |_, _| {},
    );

    for _ in 0..count {
        let k = key.read(decoder)?;
        let v = value.read(decoder)?;
        filled.value.insert(k, v);
    }

    Ok(Some(filled))
}

impl Encoder<'_> {
    /// Writes a nullable list or set of a registered type.
    ///
    /// The element serializer is resolved once, only when `collection` is
    /// present; elements are non-null value frames.
    ///
    /// # Errors
    ///
    /// - [`Error::Registry`] if the element type can't be resolved.
    /// - Any failure of the element serializer.
    pub fn write_object_collection<C: Collection>(
        &mut self,
        collection: Option<&C>,
    ) -> Result<()>
    where
        C::Item: 'static,
    {
        let Some(collection) = collection else {
            return null_container(self);
        };

        let element =
            Required(Registered::<C::Item>::resolve(self.registry())?);
        write_collection(self, Some(collection), &element)
    }

    /// Writes a nullable map whose keys and values are registered types.
    ///
    /// # Errors
    ///
    /// - [`Error::Registry`] if the key or value type can't be resolved.
    /// - Any failure of their serializers.
    pub fn write_object_map<M: Map>(&mut self, map: Option<&M>) -> Result<()>
    where
        M::Key: 'static,
        M::Value: 'static,
    {
        let Some(map) = map else {
            return null_container(self);
        };

        let key = Required(Registered::<M::Key>::resolve(self.registry())?);
        let value = Required(Registered::<M::Value>::resolve(self.registry())?);
        write_map(self, Some(map), &key, &value)
    }
}

impl Decoder<'_> {
    /// Reads a collection written by [`Encoder::write_object_collection`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedNull`] if the collection or an element is null
    ///   while not allowed.
    /// - [`Error::Registry`] if the element type can't be resolved.
    /// - [`Error::Cast`] if the serializer produced another concrete type.
    pub fn read_object_collection<C: Collection>(
        &mut self,
        allow_null: bool,
        buffer: Option<C>,
    ) -> Result<Option<Filled<C>>>
    where
        C::Item: 'static,
    {
        if !null::read_presence(self, allow_null)? {
            return Ok(None);
        }

        let element =
            Required(Registered::<C::Item>::resolve(self.registry())?);
        read_collection_body(self, buffer, &element).map(Some)
    }

    /// Reads a map written by [`Encoder::write_object_map`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedNull`] if the map, a key or a value is null while
    ///   not allowed.
    /// - [`Error::Registry`] if the key or value type can't be resolved.
    /// - [`Error::Cast`] if a serializer produced another concrete type.
    pub fn read_object_map<M: Map>(
        &mut self,
        allow_null: bool,
        buffer: Option<M>,
    ) -> Result<Option<Filled<M>>>
    where
        M::Key: 'static,
        M::Value: 'static,
    {
        if !null::read_presence(self, allow_null)? {
            return Ok(None);
        }

        let key = Required(Registered::<M::Key>::resolve(self.registry())?);
        let value = Required(Registered::<M::Value>::resolve(self.registry())?);
        read_map_body(self, buffer, &key, &value).map(Some)
    }
}

#[cfg(test)]
mod test;
