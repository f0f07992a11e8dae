//! Containment strategies.
//!
//! A strategy decides when two values count as "the same value" for a
//! store. It is the only thing that differs between the store flavors:
//!
//! - [`Equality`]: domain equality through `Eq + Hash`. Inserting a value
//!   equal to a contained one is a no-op.
//! - [`Identity`]: reference identity of `Arc<T>`. Equal but distinct
//!   allocations are stored side by side, and contained values may be
//!   mutated through interior mutability and then reindexed.
//!
//! The engine never compares values itself. It builds every bucket through
//! [`Containment::new_set`] and the reverse map through
//! [`Containment::new_map`], and both key their entries by the strategy's
//! [`Containment::Token`].

use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Policy fixing value equality for a store.
pub trait Containment<V>: Send + Sync + 'static {
    /// Hashable identity derived from a value.
    type Token: Clone + Eq + Hash + Send + Sync + 'static;

    /// Returns the identity of `value` under this policy.
    fn token(value: &V) -> Self::Token;

    /// Returns true if `a` and `b` are the same value under this policy.
    fn same(a: &V, b: &V) -> bool {
        Self::token(a) == Self::token(b)
    }

    /// Creates an empty set with this policy's semantics.
    fn new_set() -> ValueSet<V, Self>
    where
        Self: Sized,
    {
        ValueSet::new()
    }

    /// Creates an empty map keyed by values with this policy's semantics.
    fn new_map<E>() -> ValueMap<V, E, Self>
    where
        Self: Sized,
    {
        ValueMap::new()
    }
}

/// Values are the same if they are equal.
///
/// The token is a clone of the value, so every lookup clones its argument
/// and sets hold each value twice. Prefer cheaply clonable values, or
/// `Arc`-wrapped ones, for large records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Equality;

impl<V> Containment<V> for Equality
where
    V: Clone + Eq + Hash + Send + Sync + 'static,
{
    type Token = V;

    fn token(value: &V) -> V {
        value.clone()
    }
}

/// Values are the same if they point to the same allocation.
///
/// The store keeps a clone of every contained `Arc`, so an address cannot
/// be reused by another allocation while its value is contained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<T> Containment<Arc<T>> for Identity
where
    T: ?Sized + Send + Sync + 'static,
{
    type Token = usize;

    fn token(value: &Arc<T>) -> usize {
        Arc::as_ptr(value) as *const () as usize
    }
}

/// A set of values under a containment policy.
///
/// Returned by lookups as an owned snapshot; later store mutations do not
/// affect it.
pub struct ValueSet<V, S: Containment<V>> {
    entries: HashMap<S::Token, V>,
}

impl<V, S: Containment<V>> ValueSet<V, S> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates an empty set with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Adds a value. Returns false, keeping the existing one, if the same
    /// value is already present.
    pub fn insert(&mut self, value: V) -> bool {
        match self.entries.entry(S::token(&value)) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Removes a value, returning the stored instance.
    pub fn remove(&mut self, value: &V) -> Option<V> {
        self.entries.remove(&S::token(value))
    }

    /// Returns true if the set holds `value`.
    pub fn contains(&self, value: &V) -> bool {
        self.entries.contains_key(&S::token(value))
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an arbitrary value of the set.
    pub fn first(&self) -> Option<&V> {
        self.entries.values().next()
    }

    /// Iterates over the values in arbitrary order.
    pub fn iter(&self) -> hash_map::Values<'_, S::Token, V> {
        self.entries.values()
    }

    /// Consumes the set into a vector.
    pub fn into_vec(self) -> Vec<V> {
        self.entries.into_values().collect()
    }
}

impl<V, S: Containment<V>> Default for ValueSet<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone, S: Containment<V>> Clone for ValueSet<V, S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<V: fmt::Debug, S: Containment<V>> fmt::Debug for ValueSet<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.values()).finish()
    }
}

impl<V, S: Containment<V>> PartialEq for ValueSet<V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.keys().all(|t| other.entries.contains_key(t))
    }
}

impl<V, S: Containment<V>> Eq for ValueSet<V, S> {}

impl<V, S: Containment<V>> FromIterator<V> for ValueSet<V, S> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<V, S: Containment<V>> Extend<V> for ValueSet<V, S> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<V, S: Containment<V>> IntoIterator for ValueSet<V, S> {
    type Item = V;
    type IntoIter = hash_map::IntoValues<S::Token, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<'a, V, S: Containment<V>> IntoIterator for &'a ValueSet<V, S> {
    type Item = &'a V;
    type IntoIter = hash_map::Values<'a, S::Token, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// A map keyed by values under a containment policy.
pub struct ValueMap<V, E, S: Containment<V>> {
    entries: HashMap<S::Token, (V, E)>,
}

impl<V, E, S: Containment<V>> ValueMap<V, E, S> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates an empty map with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Reserves room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Returns true if `value` is a key of the map.
    pub fn contains(&self, value: &V) -> bool {
        self.entries.contains_key(&S::token(value))
    }

    /// Returns the entry stored for `value`.
    pub fn get(&self, value: &V) -> Option<&E> {
        self.entries.get(&S::token(value)).map(|(_, e)| e)
    }

    /// Returns the entry stored for `value` mutably.
    pub fn get_mut(&mut self, value: &V) -> Option<&mut E> {
        self.entries.get_mut(&S::token(value)).map(|(_, e)| e)
    }

    /// Inserts or replaces the entry for `value`, returning the old entry.
    pub fn insert(&mut self, value: V, entry: E) -> Option<E> {
        self.entries
            .insert(S::token(&value), (value, entry))
            .map(|(_, e)| e)
    }

    /// Removes `value`, returning the stored key and its entry.
    pub fn remove(&mut self, value: &V) -> Option<(V, E)> {
        self.entries.remove(&S::token(value))
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(v, _)| v)
    }

    /// Iterates over key/entry pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&V, &E)> {
        self.entries.values().map(|(v, e)| (v, e))
    }

    /// Iterates over the entries mutably.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries.values_mut().map(|(_, e)| e)
    }
}

impl<V, E, S: Containment<V>> Default for ValueMap<V, E, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, E: fmt::Debug, S: Containment<V>> fmt::Debug for ValueMap<V, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
