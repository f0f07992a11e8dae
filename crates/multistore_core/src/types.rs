//! Core type definitions for multistore.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier for a store instance.
///
/// Store IDs are process-unique and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreId(pub u64);

impl StoreId {
    /// Creates a store ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-unique store ID.
    pub(crate) fn next() -> Self {
        Self(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store:{}", self.0)
    }
}

/// Identifier for an index.
///
/// Combines the owning store with a per-store serial, so a handle from
/// one store never matches an index of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexId {
    store: StoreId,
    serial: u64,
}

impl IndexId {
    /// Creates a new index ID.
    #[must_use]
    pub const fn new(store: StoreId, serial: u64) -> Self {
        Self { store, serial }
    }

    /// Returns the owning store.
    #[must_use]
    pub const fn store(self) -> StoreId {
        self.store
    }

    /// Returns the per-store serial, in creation order.
    #[must_use]
    pub const fn serial(self) -> u64 {
        self.serial
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index:{}/{}", self.store.0, self.serial)
    }
}
