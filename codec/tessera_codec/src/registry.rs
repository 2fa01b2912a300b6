//! The type-to-serializer registry.
//!
//! Serializers are keyed by [`TypeId`] in two independent maps: one for
//! concrete types and one for interfaces (trait object types extending
//! [`Object`]). Resolving a type probes the concrete map by exact match
//! first; on a miss it looks at the registered interfaces the type was
//! declared to implement and picks the most specific one.
//!
//! # Example
//!
//! ```rust
//! use tessera_codec::{
//!     BinarySerializer, DataInput, DataOutput, Decoder, Encoder, Object,
//!     Registry, Result,
//! };
//!
//! trait Shape: Object {
//!     fn area(&self) -> f64;
//! }
//!
//! struct Square(f64);
//!
//! impl Shape for Square {
//!     fn area(&self) -> f64 { self.0 * self.0 }
//! }
//!
//! struct ShapeSerializer;
//!
//! impl BinarySerializer<dyn Shape> for ShapeSerializer {
//!     fn write(&self, value: &dyn Shape, encoder: &mut Encoder) -> Result<()> {
//!         encoder.write_f64(value.area().sqrt())
//!     }
//!
//!     fn read(&self, decoder: &mut Decoder) -> Result<Box<dyn Shape>> {
//!         Ok(Box::new(Square(decoder.read_f64()?)))
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_interface::<dyn Shape>(ShapeSerializer);
//! registry.implement::<Square, dyn Shape>(|square| square);
//!
//! // `Square` has no serializer of its own and resolves through `dyn Shape`
//! assert!(registry.get::<Square>().is_some());
//! ```

use std::{
    any::{Any, TypeId},
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    BinarySerializer, Decoder, Encoder, Error, Object, RegistryError, Result,
};

/// A shared serializer resolved from a [`Registry`].
pub type SharedSerializer<T> = Arc<dyn BinarySerializer<T>>;

/// Holds a `SharedSerializer<T>` behind `dyn Any`.
type Erased = Box<dyn Any + Send + Sync>;

struct Entry {
    type_name: &'static str,
    serializer: Erased,
}

impl Entry {
    fn new<T: ?Sized + 'static>(serializer: SharedSerializer<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            serializer: Box::new(serializer),
        }
    }

    fn downcast<T: ?Sized + 'static>(&self) -> Option<SharedSerializer<T>> {
        self.serializer.downcast_ref::<SharedSerializer<T>>().cloned()
    }
}

/// A declared "concrete type implements interface" relation.
trait Implementation: Send + Sync {
    fn interface(&self) -> TypeId;

    /// Wraps the interface serializer into a serializer of the concrete type.
    fn adapt(&self, interface_serializer: &Entry) -> Option<Erased>;
}

struct Upcast<C, I: ?Sized> {
    upcast: fn(&C) -> &I,
}

impl<C: Object, I: ?Sized + Object> Implementation for Upcast<C, I> {
    fn interface(&self) -> TypeId { TypeId::of::<I>() }

    fn adapt(&self, interface_serializer: &Entry) -> Option<Erased> {
        let inner = interface_serializer.downcast::<I>()?;
        let adapted: SharedSerializer<C> =
            Arc::new(ViaInterface { inner, upcast: self.upcast });

        Some(Box::new(adapted))
    }
}

/// Serializes a concrete type with the serializer of one of its interfaces.
struct ViaInterface<C, I: ?Sized> {
    inner: SharedSerializer<I>,
    upcast: fn(&C) -> &I,
}

impl<C: Object, I: ?Sized + Object> BinarySerializer<C> for ViaInterface<C, I> {
    fn write(&self, value: &C, encoder: &mut Encoder<'_>) -> Result<()> {
        self.inner.write((self.upcast)(value), encoder)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<Box<C>> {
        let value = self.inner.read(decoder)?;
        let found = Object::type_name(&*value);

        Object::into_any(value).downcast::<C>().map_err(|_| Error::Cast {
            expected: std::any::type_name::<C>(),
            found,
        })
    }
}

/// Maps types to their [`BinarySerializer`].
///
/// The registry is meant to be populated once at startup and then shared
/// immutably; use [`SharedRegistry`] when registration has to happen
/// concurrently with lookups.
#[derive(Default)]
pub struct Registry {
    classes: HashMap<TypeId, Entry>,
    interfaces: HashMap<TypeId, Entry>,
    implementations: HashMap<TypeId, Vec<Box<dyn Implementation>>>,
    super_interfaces: HashMap<TypeId, HashSet<TypeId>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut classes =
            self.classes.values().map(|x| x.type_name).collect::<Vec<_>>();
        let mut interfaces =
            self.interfaces.values().map(|x| x.type_name).collect::<Vec<_>>();

        classes.sort_unstable();
        interfaces.sort_unstable();

        f.debug_struct("Registry")
            .field("classes", &classes)
            .field("interfaces", &interfaces)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a registry populated by every given [`Registrar`], in order.
    #[must_use]
    pub fn from_registrars<'r>(
        registrars: impl IntoIterator<Item = &'r dyn Registrar>,
    ) -> Self {
        let mut registry = Self::new();

        for registrar in registrars {
            registry.install(registrar);
        }

        registry
    }

    /// Lets `registrar` add its serializers to this registry.
    pub fn install(&mut self, registrar: &dyn Registrar) {
        log::debug!("installing registrar `{}`", registrar.name());
        registrar.register(self);
    }

    /// Registers the serializer of the concrete type `T`.
    ///
    /// Returns `true` if a previous serializer for `T` was replaced.
    pub fn register<T: 'static>(
        &mut self,
        serializer: impl BinarySerializer<T> + 'static,
    ) -> bool {
        self.register_shared::<T>(Arc::new(serializer))
    }

    /// Registers an already shared serializer of the concrete type `T`.
    ///
    /// Returns `true` if a previous serializer for `T` was replaced.
    pub fn register_shared<T: 'static>(
        &mut self,
        serializer: SharedSerializer<T>,
    ) -> bool {
        Self::insert(
            &mut self.classes,
            Entry::new(serializer),
            TypeId::of::<T>(),
        )
    }

    /// Registers the serializer of the interface `I`, a trait object type
    /// such as `dyn Shape`.
    ///
    /// Concrete types only resolve to it once declared with
    /// [`Self::implement`]. Returns `true` if a previous serializer for `I`
    /// was replaced.
    pub fn register_interface<I: ?Sized + Object>(
        &mut self,
        serializer: impl BinarySerializer<I> + 'static,
    ) -> bool {
        let serializer: SharedSerializer<I> = Arc::new(serializer);

        Self::insert(
            &mut self.interfaces,
            Entry::new(serializer),
            TypeId::of::<I>(),
        )
    }

    fn insert(
        map: &mut HashMap<TypeId, Entry>,
        entry: Entry,
        type_id: TypeId,
    ) -> bool {
        let type_name = entry.type_name;
        let replaced = map.insert(type_id, entry).is_some();

        if replaced {
            log::warn!("replaced the binary serializer of `{type_name}`");
        } else {
            log::debug!("registered a binary serializer for `{type_name}`");
        }

        replaced
    }

    /// Declares that the concrete type `C` implements the interface `I`.
    ///
    /// `upcast` converts a reference to the interface, usually `|x| x`.
    /// Declaring the same pair again replaces the previous declaration.
    pub fn implement<C: Object, I: ?Sized + Object>(
        &mut self,
        upcast: fn(&C) -> &I,
    ) {
        let implementations =
            self.implementations.entry(TypeId::of::<C>()).or_default();

        implementations.retain(|x| x.interface() != TypeId::of::<I>());
        implementations.push(Box::new(Upcast { upcast }));
    }

    /// Declares that the interface `Sub` extends the interface `Super`,
    /// making `Sub` the more specific of the two during resolution.
    pub fn extend<Sub: ?Sized + Object, Super: ?Sized + Object>(&mut self) {
        self.super_interfaces
            .entry(TypeId::of::<Sub>())
            .or_default()
            .insert(TypeId::of::<Super>());
    }

    /// Returns `true` if `sub` transitively extends `sup`.
    fn extends(&self, sub: TypeId, sup: TypeId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([sub]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }

            let Some(supers) = self.super_interfaces.get(&current) else {
                continue;
            };

            if supers.contains(&sup) {
                return true;
            }

            queue.extend(supers.iter().copied());
        }

        false
    }

    /// Resolves the serializer of `T`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if neither `T` nor any interface
    ///   it implements has a serializer.
    /// - [`RegistryError::Ambiguous`] if `T` implements several registered
    ///   interfaces and none of them extends all the others.
    pub fn resolve<T: ?Sized + 'static>(
        &self,
    ) -> std::result::Result<SharedSerializer<T>, RegistryError> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(serializer) = self
            .classes
            .get(&type_id)
            .or_else(|| self.interfaces.get(&type_id))
            .and_then(Entry::downcast::<T>)
        {
            return Ok(serializer);
        }

        let candidates = self
            .implementations
            .get(&type_id)
            .into_iter()
            .flatten()
            .filter_map(|implementation| {
                self.interfaces
                    .get(&implementation.interface())
                    .map(|entry| (implementation, entry))
            })
            .collect::<Vec<_>>();

        let most_specific = candidates.iter().filter(|(candidate, _)| {
            candidates.iter().all(|(other, _)| {
                other.interface() == candidate.interface()
                    || self.extends(candidate.interface(), other.interface())
            })
        });

        let mut most_specific = most_specific.collect::<Vec<_>>();

        match (most_specific.pop(), most_specific.is_empty()) {
            (Some((implementation, entry)), true) => {
                log::trace!(
                    "resolved `{type_name}` through interface `{}`",
                    entry.type_name
                );

                implementation
                    .adapt(entry)
                    .and_then(|erased| {
                        erased.downcast_ref::<SharedSerializer<T>>().cloned()
                    })
                    .ok_or(RegistryError::NotRegistered { type_name })
            }

            (None, _) if candidates.is_empty() => {
                Err(RegistryError::NotRegistered { type_name })
            }

            _ => {
                let mut candidates = candidates
                    .iter()
                    .map(|(_, entry)| entry.type_name)
                    .collect::<Vec<_>>();
                candidates.sort_unstable();

                Err(RegistryError::Ambiguous { type_name, candidates })
            }
        }
    }

    /// Returns the serializer of `T`, `None` if it can't be resolved.
    #[must_use]
    pub fn get<T: ?Sized + 'static>(&self) -> Option<SharedSerializer<T>> {
        self.resolve::<T>().ok()
    }

    /// Returns `true` if the serializer of `T` can be resolved.
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.resolve::<T>().is_ok()
    }

    /// Returns the number of registered serializers, concrete and interface.
    #[must_use]
    pub fn len(&self) -> usize { self.classes.len() + self.interfaces.len() }

    /// Returns `true` if no serializer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Removes every serializer and every declared relation.
    pub fn clear(&mut self) {
        log::debug!("clearing {} binary serializers", self.len());

        self.classes.clear();
        self.interfaces.clear();
        self.implementations.clear();
        self.super_interfaces.clear();
    }
}

/// A unit of serializer registration, discovered and installed at startup.
pub trait Registrar {
    /// Adds the serializers of this registrar to `registry`.
    fn register(&self, registry: &mut Registry);

    /// Returns the name used in logs.
    fn name(&self) -> &str { std::any::type_name::<Self>() }
}

impl<F: Fn(&mut Registry)> Registrar for F {
    fn register(&self, registry: &mut Registry) { self(registry); }
}

/// A [`Registry`] guarded by a read/write lock, for programs that register
/// serializers while other threads are already encoding.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    inner: RwLock<Registry>,
}

impl SharedRegistry {
    /// Wraps an existing registry.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self { inner: RwLock::new(registry) }
    }

    /// Locks the registry for lookups.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, Registry> { self.inner.read() }

    /// Locks the registry for registration.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, Registry> { self.inner.write() }

    /// Registers the serializer of the concrete type `T`.
    pub fn register<T: 'static>(
        &self,
        serializer: impl BinarySerializer<T> + 'static,
    ) -> bool {
        self.inner.write().register(serializer)
    }

    /// Resolves the serializer of `T`.
    ///
    /// # Errors
    ///
    /// See [`Registry::resolve`].
    pub fn resolve<T: ?Sized + 'static>(
        &self,
    ) -> std::result::Result<SharedSerializer<T>, RegistryError> {
        self.inner.read().resolve()
    }

    /// Unwraps the registry.
    #[must_use]
    pub fn into_inner(self) -> Registry { self.inner.into_inner() }
}
