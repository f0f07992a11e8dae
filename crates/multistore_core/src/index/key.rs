//! Index key types.

use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A key that can be indexed.
///
/// Implemented for every `Clone + Eq + Hash + Send + Sync + 'static` type.
pub trait IndexKey: Clone + Eq + Hash + Send + Sync + 'static {}

impl<T> IndexKey for T where T: Clone + Eq + Hash + Send + Sync + 'static {}

/// Object-safe view of an [`IndexKey`].
///
/// Lets one forward table hold indices whose key types differ, and lets a
/// typed `&K` be looked up without boxing it first.
pub(crate) trait DynKey: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<K: IndexKey> DynKey for K {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

impl PartialEq for dyn DynKey {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Eq for dyn DynKey {}

impl Hash for dyn DynKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

/// Views a typed key as a lookup probe for maps keyed by [`ErasedKey`].
pub(crate) fn probe<K: IndexKey>(key: &K) -> &(dyn DynKey + 'static) {
    key
}

/// A type-erased index key.
#[derive(Clone)]
pub(crate) struct ErasedKey(Arc<dyn DynKey>);

impl ErasedKey {
    pub(crate) fn new<K: IndexKey>(key: K) -> Self {
        Self(Arc::new(key))
    }

    /// Returns the typed key, or `None` if `K` is not the stored type.
    pub(crate) fn downcast_ref<K: IndexKey>(&self) -> Option<&K> {
        (*self.0).as_any().downcast_ref::<K>()
    }
}

impl PartialEq for ErasedKey {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl Eq for ErasedKey {}

impl Hash for ErasedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl Borrow<dyn DynKey> for ErasedKey {
    fn borrow(&self) -> &(dyn DynKey + 'static) {
        &*self.0
    }
}

impl fmt::Debug for ErasedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedKey(..)")
    }
}
