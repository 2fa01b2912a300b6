//! Abstractions over the standard collections a container frame can be read
//! into and written from.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::{BuildHasher, Hash},
};

/// A list or set of elements.
pub trait Collection: Default {
    /// The element type.
    type Item;

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if there is no element.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Removes every element, keeping the allocation.
    fn clear(&mut self);

    /// Reserves room for `additional` more elements where supported.
    fn reserve(&mut self, _additional: usize) {}

    /// Adds an element.
    fn insert(&mut self, item: Self::Item);

    /// Iterates over the elements in the order they are written.
    fn items(&self) -> impl Iterator<Item = &Self::Item>;
}

impl<T> Collection for Vec<T> {
    type Item = T;

    fn len(&self) -> usize { Vec::len(self) }

    fn clear(&mut self) { Vec::clear(self); }

    fn reserve(&mut self, additional: usize) { Vec::reserve(self, additional); }

    fn insert(&mut self, item: T) { self.push(item); }

    fn items(&self) -> impl Iterator<Item = &T> { self.iter() }
}

impl<T> Collection for VecDeque<T> {
    type Item = T;

    fn len(&self) -> usize { VecDeque::len(self) }

    fn clear(&mut self) { VecDeque::clear(self); }

    fn reserve(&mut self, additional: usize) {
        VecDeque::reserve(self, additional);
    }

    fn insert(&mut self, item: T) { self.push_back(item); }

    fn items(&self) -> impl Iterator<Item = &T> { self.iter() }
}

impl<T: Eq + Hash, S: BuildHasher + Default> Collection for HashSet<T, S> {
    type Item = T;

    fn len(&self) -> usize { HashSet::len(self) }

    fn clear(&mut self) { HashSet::clear(self); }

    fn reserve(&mut self, additional: usize) {
        HashSet::reserve(self, additional);
    }

    fn insert(&mut self, item: T) { HashSet::insert(self, item); }

    fn items(&self) -> impl Iterator<Item = &T> { self.iter() }
}

impl<T: Ord> Collection for BTreeSet<T> {
    type Item = T;

    fn len(&self) -> usize { BTreeSet::len(self) }

    fn clear(&mut self) { BTreeSet::clear(self); }

    fn insert(&mut self, item: T) { BTreeSet::insert(self, item); }

    fn items(&self) -> impl Iterator<Item = &T> { self.iter() }
}

/// A map with one value per key.
pub trait Map: Default {
    /// The key type.
    type Key;

    /// The value type.
    type Value;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there is no entry.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Removes every entry, keeping the allocation.
    fn clear(&mut self);

    /// Reserves room for `additional` more entries where supported.
    fn reserve(&mut self, _additional: usize) {}

    /// Inserts an entry, replacing the value of an equal key.
    fn insert(&mut self, key: Self::Key, value: Self::Value);

    /// Iterates over the entries.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> Map for HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn len(&self) -> usize { HashMap::len(self) }

    fn clear(&mut self) { HashMap::clear(self); }

    fn reserve(&mut self, additional: usize) {
        HashMap::reserve(self, additional);
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> { self.iter() }
}

impl<K: Ord, V> Map for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn len(&self) -> usize { BTreeMap::len(self) }

    fn clear(&mut self) { BTreeMap::clear(self); }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> { self.iter() }
}

/// A map holding any number of values per key, stored as a `Vec` per key.
///
/// The wire carries one key frame and one value frame per pair, so a key
/// with three values is written three times.
pub trait Multimap: Default {
    /// The key type.
    type Key;

    /// The value type.
    type Value;

    /// Returns the total number of key/value pairs.
    fn pair_count(&self) -> usize;

    /// Removes every pair, keeping the allocation.
    fn clear(&mut self);

    /// Appends `value` to the values of `key`.
    fn insert(&mut self, key: Self::Key, value: Self::Value);

    /// Iterates over every key/value pair, grouped by key.
    fn pairs(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> Multimap
    for HashMap<K, Vec<V>, S>
{
    type Key = K;
    type Value = V;

    fn pair_count(&self) -> usize { self.values().map(Vec::len).sum() }

    fn clear(&mut self) { HashMap::clear(self); }

    fn insert(&mut self, key: K, value: V) {
        self.entry(key).or_default().push(value);
    }

    fn pairs(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
            .flat_map(|(key, values)| values.iter().map(move |x| (key, x)))
    }
}

impl<K: Ord, V> Multimap for BTreeMap<K, Vec<V>> {
    type Key = K;
    type Value = V;

    fn pair_count(&self) -> usize { self.values().map(Vec::len).sum() }

    fn clear(&mut self) { BTreeMap::clear(self); }

    fn insert(&mut self, key: K, value: V) {
        self.entry(key).or_default().push(value);
    }

    fn pairs(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
            .flat_map(|(key, values)| values.iter().map(move |x| (key, x)))
    }
}
