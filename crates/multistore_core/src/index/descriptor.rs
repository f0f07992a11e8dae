//! Index descriptors and the typed handles handed out to callers.

use crate::error::{KeyExtractionError, StoreError, StoreResult};
use crate::index::key::{ErasedKey, IndexKey};
use crate::types::IndexId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Whether an index allows several values per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// At most one value per key. Indexing a second value under an
    /// occupied key evicts the holder from the whole store.
    Unique,
    /// Any number of values per key.
    NonUnique,
}

pub(crate) type Extractor<K, V> =
    dyn Fn(&V) -> Result<Option<K>, KeyExtractionError> + Send + Sync;

/// Immutable pairing of a key extractor with an index kind.
pub(crate) struct IndexDescriptor<K, V> {
    id: IndexId,
    kind: IndexKind,
    extractor: Box<Extractor<K, V>>,
}

impl<K, V> IndexDescriptor<K, V> {
    pub(crate) fn new(id: IndexId, kind: IndexKind, extractor: Box<Extractor<K, V>>) -> Self {
        Self {
            id,
            kind,
            extractor,
        }
    }

    /// Runs the extractor. Its result, including errors, is returned as is.
    pub(crate) fn get_key(&self, value: &V) -> Result<Option<K>, KeyExtractionError> {
        (self.extractor)(value)
    }
}

/// Key-type-erased view of a descriptor, as held by the forward table.
pub(crate) trait ErasedIndex<V>: Send + Sync {
    fn id(&self) -> IndexId;
    fn kind(&self) -> IndexKind;
    fn erased_key(&self, value: &V) -> StoreResult<Option<ErasedKey>>;
}

impl<K: IndexKey, V: 'static> ErasedIndex<V> for IndexDescriptor<K, V> {
    fn id(&self) -> IndexId {
        self.id
    }

    fn kind(&self) -> IndexKind {
        self.kind
    }

    fn erased_key(&self, value: &V) -> StoreResult<Option<ErasedKey>> {
        self.get_key(value)
            .map(|key| key.map(ErasedKey::new))
            .map_err(|source| StoreError::key_extraction(self.id, source))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Operations shared by both index handle types.
///
/// Handles compare by identity: two handles are equal only if they refer
/// to the same index of the same store.
pub trait Index<K, V>: sealed::Sealed {
    /// Returns the index identifier.
    fn id(&self) -> IndexId;

    /// Returns the index kind.
    fn kind(&self) -> IndexKind;

    /// Computes the key this index derives from `value`.
    ///
    /// `Ok(None)` means the value is not indexed here.
    fn get_key(&self, value: &V) -> Result<Option<K>, KeyExtractionError>;
}

macro_rules! index_handle {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $name<K, V> {
            descriptor: Arc<IndexDescriptor<K, V>>,
        }

        impl<K, V> $name<K, V> {
            pub(crate) fn new(descriptor: Arc<IndexDescriptor<K, V>>) -> Self {
                debug_assert_eq!(descriptor.kind, $kind);
                Self { descriptor }
            }
        }

        impl<K, V> sealed::Sealed for $name<K, V> {}

        impl<K, V> Index<K, V> for $name<K, V> {
            fn id(&self) -> IndexId {
                self.descriptor.id
            }

            fn kind(&self) -> IndexKind {
                self.descriptor.kind
            }

            fn get_key(&self, value: &V) -> Result<Option<K>, KeyExtractionError> {
                self.descriptor.get_key(value)
            }
        }

        impl<K, V> Clone for $name<K, V> {
            fn clone(&self) -> Self {
                Self {
                    descriptor: Arc::clone(&self.descriptor),
                }
            }
        }

        impl<K, V> PartialEq for $name<K, V> {
            fn eq(&self, other: &Self) -> bool {
                self.descriptor.id == other.descriptor.id
            }
        }

        impl<K, V> Eq for $name<K, V> {}

        impl<K, V> Hash for $name<K, V> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.descriptor.id.hash(state);
            }
        }

        impl<K, V> fmt::Debug for $name<K, V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.descriptor.id)
                    .finish()
            }
        }
    };
}

index_handle!(
    /// Handle to a unique index: at most one value per key.
    UniqueIndex,
    IndexKind::Unique
);

index_handle!(
    /// Handle to a non-unique index: any number of values per key.
    NonUniqueIndex,
    IndexKind::NonUnique
);
