//! Store statistics.
//!
//! Counters are bumped after the store releases its lock and are read
//! without taking it, so a snapshot may lag behind or straddle concurrent
//! writes.
//!
//! ```rust,ignore
//! let store = HashMultiIndexStore::<User>::new();
//! store.insert(user)?;
//!
//! let stats = store.stats();
//! println!("inserts: {}", stats.inserts);
//! println!("evictions: {}", stats.evictions);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
///
/// All counters are monotonically increasing.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Values newly inserted.
    inserts: AtomicU64,
    /// Values removed by the caller.
    removes: AtomicU64,
    /// Successful reindex calls.
    updates: AtomicU64,
    /// Values evicted by a unique-key collision.
    evictions: AtomicU64,
    /// Index lookups (find and enumeration calls).
    lookups: AtomicU64,
    /// Indices created, including rolled-back ones.
    indexes_created: AtomicU64,
    /// Key extractor failures.
    extraction_errors: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evictions.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_index_created(&self) {
        self.indexes_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_extraction_error(&self) {
        self.extraction_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of inserted values.
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Returns the number of removed values.
    pub fn removes(&self) -> u64 {
        self.removes.load(Ordering::Relaxed)
    }

    /// Returns the number of successful updates.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Returns the number of collision evictions.
    ///
    /// A high count usually means unique keys are being reused on purpose.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns the number of index lookups.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Returns the number of created indices.
    pub fn indexes_created(&self) -> u64 {
        self.indexes_created.load(Ordering::Relaxed)
    }

    /// Returns the number of key extractor failures.
    pub fn extraction_errors(&self) -> u64 {
        self.extraction_errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts: self.inserts(),
            removes: self.removes(),
            updates: self.updates(),
            evictions: self.evictions(),
            lookups: self.lookups(),
            indexes_created: self.indexes_created(),
            extraction_errors: self.extraction_errors(),
        }
    }
}

/// A point-in-time snapshot of store statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Values newly inserted.
    pub inserts: u64,
    /// Values removed by the caller.
    pub removes: u64,
    /// Successful reindex calls.
    pub updates: u64,
    /// Values evicted by a unique-key collision.
    pub evictions: u64,
    /// Index lookups.
    pub lookups: u64,
    /// Indices created.
    pub indexes_created: u64,
    /// Key extractor failures.
    pub extraction_errors: u64,
}
