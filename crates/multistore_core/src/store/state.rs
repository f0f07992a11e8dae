//! Forward table and reverse map.
//!
//! `StoreState` owns both halves of the index bookkeeping and implements
//! every structural algorithm on `&mut self`. It has no locking of its own:
//! the store hands it out from its guard, and nested steps (an eviction
//! inside an insert, a removal inside an eviction) run on the same borrow.
//!
//! # Invariants
//!
//! - `(idx, k) ∈ reverse[v]` if and only if `v ∈ forward[idx][k]`
//! - unique buckets hold at most one value
//! - no bucket is ever empty
//! - a value is contained if and only if it is a key of `reverse`
//!
//! Each per-index step calls the extractor first and only then writes the
//! forward and reverse sides together, so the first invariant holds even
//! when an extractor fails half-way through an operation.

use crate::containment::{Containment, ValueMap, ValueSet};
use crate::error::{StoreError, StoreResult};
use crate::index::{probe, ErasedIndex, ErasedKey, IndexKey, IndexKind};
use crate::types::{IndexId, StoreId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// One recorded `(index, key)` pair in a value's reverse entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Membership {
    serial: u64,
    key: ErasedKey,
}

/// Buckets of one index.
pub(crate) struct IndexTable<V, S: Containment<V>> {
    descriptor: Arc<dyn ErasedIndex<V>>,
    buckets: HashMap<ErasedKey, ValueSet<V, S>>,
}

impl<V, S: Containment<V>> IndexTable<V, S> {
    pub(crate) fn kind(&self) -> IndexKind {
        self.descriptor.kind()
    }

    pub(crate) fn bucket<K: IndexKey>(&self, key: &K) -> Option<&ValueSet<V, S>> {
        self.buckets.get(probe(key))
    }

    /// Iterates over populated buckets with their typed keys.
    pub(crate) fn entries<K: IndexKey>(&self) -> impl Iterator<Item = (&K, &ValueSet<V, S>)> {
        self.buckets
            .iter()
            .filter_map(|(key, bucket)| key.downcast_ref::<K>().map(|k| (k, bucket)))
    }

    fn indexed_values(&self) -> usize {
        self.buckets.values().map(ValueSet::len).sum()
    }
}

/// The index bookkeeping of one store.
pub(crate) struct StoreState<V, S: Containment<V>> {
    store: StoreId,
    /// Index serial to buckets, in creation order.
    forward: BTreeMap<u64, IndexTable<V, S>>,
    /// Value to the memberships recorded for it.
    reverse: ValueMap<V, HashSet<Membership>, S>,
    next_serial: u64,
    /// Evictions since the last `take_evicted`.
    evicted: u64,
}

impl<V, S> StoreState<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: Containment<V>,
{
    pub(crate) fn new(store: StoreId, capacity: usize) -> Self {
        let mut reverse = S::new_map();
        reverse.reserve(capacity);
        Self {
            store,
            forward: BTreeMap::new(),
            reverse,
            next_serial: 1,
            evicted: 0,
        }
    }

    pub(crate) fn allocate_index_id(&mut self) -> IndexId {
        let serial = self.next_serial;
        self.next_serial += 1;
        IndexId::new(self.store, serial)
    }

    pub(crate) fn contains(&self, value: &V) -> bool {
        self.reverse.contains(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.reverse.len()
    }

    pub(crate) fn index_count(&self) -> usize {
        self.forward.len()
    }

    /// Returns and resets the number of evictions performed.
    pub(crate) fn take_evicted(&mut self) -> u64 {
        std::mem::take(&mut self.evicted)
    }

    /// Looks up an index table, rejecting handles of other stores.
    pub(crate) fn table(&self, id: IndexId) -> StoreResult<&IndexTable<V, S>> {
        if id.store() != self.store {
            return Err(StoreError::unknown_index(id));
        }
        self.forward
            .get(&id.serial())
            .ok_or_else(|| StoreError::unknown_index(id))
    }

    /// Snapshot of every contained value.
    pub(crate) fn values(&self) -> ValueSet<V, S> {
        let mut values = ValueSet::with_capacity(self.reverse.len());
        values.extend(self.reverse.keys().cloned());
        values
    }

    pub(crate) fn insert(&mut self, value: V) -> StoreResult<bool> {
        if self.reverse.contains(&value) {
            return Ok(false);
        }
        self.reverse.insert(value.clone(), HashSet::new());
        self.index_all(&value)?;
        Ok(true)
    }

    pub(crate) fn remove(&mut self, value: &V) -> bool {
        if !self.reverse.contains(value) {
            return false;
        }
        self.unindex_all(value);
        self.reverse.remove(value);
        true
    }

    /// Drops all memberships of `value` and recomputes them. The reverse
    /// entry itself stays in place throughout.
    pub(crate) fn reindex(&mut self, value: &V) -> StoreResult<bool> {
        if !self.reverse.contains(value) {
            return Ok(false);
        }
        self.unindex_all(value);
        self.index_all(value)?;
        Ok(true)
    }

    /// Registers a new index and backfills it over the contained values.
    ///
    /// Returns the number of values the index ended up holding. If an
    /// extractor fails the index is unregistered again before the error is
    /// returned; evictions done by the partial backfill stay.
    pub(crate) fn register_index(
        &mut self,
        descriptor: Arc<dyn ErasedIndex<V>>,
    ) -> StoreResult<usize> {
        let serial = descriptor.id().serial();
        self.forward.insert(
            serial,
            IndexTable {
                descriptor,
                buckets: HashMap::new(),
            },
        );

        // A unique backfill may evict values, so walk a copy.
        let snapshot: Vec<V> = self.reverse.keys().cloned().collect();
        for value in &snapshot {
            if !self.reverse.contains(value) {
                continue;
            }
            if let Err(err) = self.index_one(value, serial) {
                warn!(index = serial, error = %err, "backfill failed, dropping index");
                self.unregister_index(serial);
                return Err(err);
            }
        }

        Ok(self
            .forward
            .get(&serial)
            .map_or(0, IndexTable::indexed_values))
    }

    /// Empties every bucket and the reverse map. Index definitions stay.
    pub(crate) fn clear(&mut self) {
        self.reverse.clear();
        for table in self.forward.values_mut() {
            table.buckets.clear();
        }
    }

    /// Checks every invariant listed in the module docs.
    pub(crate) fn verify(&self) -> StoreResult<()> {
        for (&serial, table) in &self.forward {
            for (key, bucket) in &table.buckets {
                if bucket.is_empty() {
                    return Err(StoreError::inconsistent(format!(
                        "index {serial} keeps an empty bucket"
                    )));
                }
                if table.kind() == IndexKind::Unique && bucket.len() > 1 {
                    return Err(StoreError::inconsistent(format!(
                        "unique index {serial} holds {} values under one key",
                        bucket.len()
                    )));
                }
                let membership = Membership {
                    serial,
                    key: key.clone(),
                };
                for value in bucket {
                    match self.reverse.get(value) {
                        Some(memberships) if memberships.contains(&membership) => {}
                        Some(_) => {
                            return Err(StoreError::inconsistent(format!(
                                "index {serial} lists a value whose reverse entry lacks the key"
                            )))
                        }
                        None => {
                            return Err(StoreError::inconsistent(format!(
                                "index {serial} lists a value that is not contained"
                            )))
                        }
                    }
                }
            }
        }

        for (value, memberships) in self.reverse.iter() {
            let mut seen = HashSet::with_capacity(memberships.len());
            for membership in memberships {
                if !seen.insert(membership.serial) {
                    return Err(StoreError::inconsistent(format!(
                        "value recorded twice in index {}",
                        membership.serial
                    )));
                }
                let present = self
                    .forward
                    .get(&membership.serial)
                    .and_then(|table| table.buckets.get(&membership.key))
                    .is_some_and(|bucket| bucket.contains(value));
                if !present {
                    return Err(StoreError::inconsistent(format!(
                        "reverse entry points at a missing bucket of index {}",
                        membership.serial
                    )));
                }
            }
        }

        Ok(())
    }

    fn index_all(&mut self, value: &V) -> StoreResult<()> {
        let serials: Vec<u64> = self.forward.keys().copied().collect();
        for serial in serials {
            self.index_one(value, serial)?;
        }
        Ok(())
    }

    /// Indexes one value against one index, resolving unique collisions.
    fn index_one(&mut self, value: &V, serial: u64) -> StoreResult<()> {
        let Some(table) = self.forward.get(&serial) else {
            return Ok(());
        };
        let Some(key) = table.descriptor.erased_key(value)? else {
            return Ok(());
        };

        match table.kind() {
            IndexKind::Unique => {
                let holder = table.buckets.get(&key).and_then(ValueSet::first).cloned();
                match holder {
                    Some(holder) if S::same(&holder, value) => {}
                    Some(holder) => {
                        self.evict(&holder, serial);
                        self.put_singleton(serial, key.clone(), value);
                    }
                    None => self.put_singleton(serial, key.clone(), value),
                }
            }
            IndexKind::NonUnique => {
                if let Some(table) = self.forward.get_mut(&serial) {
                    table
                        .buckets
                        .entry(key.clone())
                        .or_insert_with(S::new_set)
                        .insert(value.clone());
                }
            }
        }

        if let Some(memberships) = self.reverse.get_mut(value) {
            memberships.insert(Membership { serial, key });
        }
        Ok(())
    }

    fn put_singleton(&mut self, serial: u64, key: ErasedKey, value: &V) {
        if let Some(table) = self.forward.get_mut(&serial) {
            let mut bucket = S::new_set();
            bucket.insert(value.clone());
            table.buckets.insert(key, bucket);
        }
    }

    /// Removes the current holder of a unique key from the whole store.
    fn evict(&mut self, holder: &V, serial: u64) {
        if self.remove(holder) {
            self.evicted += 1;
            debug!(index = serial, "unique key collision, evicted previous holder");
        }
    }

    fn unindex_all(&mut self, value: &V) {
        let memberships = match self.reverse.get_mut(value) {
            Some(memberships) => std::mem::take(memberships),
            None => return,
        };

        for Membership { serial, key } in memberships {
            let Some(table) = self.forward.get_mut(&serial) else {
                continue;
            };
            if let Some(bucket) = table.buckets.get_mut(&key) {
                bucket.remove(value);
                if bucket.is_empty() {
                    table.buckets.remove(&key);
                }
            }
        }
    }

    fn unregister_index(&mut self, serial: u64) {
        self.forward.remove(&serial);
        for memberships in self.reverse.entries_mut() {
            memberships.retain(|m| m.serial != serial);
        }
    }
}
