//! The public store type.

use crate::config::StoreConfig;
use crate::containment::{Containment, Equality, Identity, ValueSet};
use crate::error::{KeyExtractionError, StoreError, StoreResult};
use crate::guard::ReadWriteGuard;
use crate::index::{
    ErasedIndex, Extractor, Index, IndexDescriptor, IndexKey, IndexKind, NonUniqueIndex,
    UniqueIndex,
};
use crate::stats::{StatsSnapshot, StoreStats};
use crate::store::state::StoreState;
use crate::types::StoreId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, trace, warn, Span};

/// A thread-safe collection of values with any number of secondary indices.
///
/// Indices are created at runtime from key-extraction functions and are
/// backfilled over the values already present. Every query returns an
/// owned snapshot, so the internal lock is released before the caller
/// looks at the result.
///
/// `S` picks what "the same value" means; see [`crate::containment`].
///
/// # Example
///
/// ```rust,ignore
/// let store = HashMultiIndexStore::<User>::new();
/// let by_last_name = store.create_index(|u: &User| u.last_name.clone())?;
/// let by_id = store.create_unique_index(|u: &User| Some(u.id))?;
///
/// store.insert(User::new(1, "John", "Doe"))?;
/// store.insert(User::new(2, "Jane", "Doe"))?;
///
/// assert_eq!(store.find_by(&by_last_name, &"Doe".to_string())?.len(), 2);
/// assert!(store.find_unique(&by_id, &1)?.is_some());
/// ```
///
/// # Failing extractors
///
/// Extractors registered through the `try_` constructors may fail. When
/// one fails during `insert` or `update`, indices processed before it keep
/// the new memberships, the value stays contained, and evictions already
/// triggered are not undone. When one fails during index creation, the new
/// index is dropped again. Index bookkeeping stays self-consistent in both
/// cases.
///
/// Extractors run under the store's exclusive lock and must not call back
/// into the same store.
pub struct MultiIndexStore<V, S: Containment<V> = Equality> {
    id: StoreId,
    config: StoreConfig,
    state: ReadWriteGuard<StoreState<V, S>>,
    stats: StoreStats,
    span: Span,
}

/// Store whose values are the same when they are equal.
pub type HashMultiIndexStore<V> = MultiIndexStore<V, Equality>;

/// Store whose values are the same when they share an allocation.
///
/// Values may be mutated through interior mutability and then reindexed
/// with [`MultiIndexStore::update`].
pub type IdentityMultiIndexStore<T> = MultiIndexStore<Arc<T>, Identity>;

impl<V, S> MultiIndexStore<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: Containment<V>,
{
    /// Creates an empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let id = StoreId::next();
        let span = debug_span!("multistore", store = %config.name, id = id.as_u64());
        Self {
            id,
            state: ReadWriteGuard::new(StoreState::new(id, config.initial_capacity)),
            config,
            stats: StoreStats::new(),
            span,
        }
    }

    /// Returns the store identifier.
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Returns the configuration the store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns a snapshot of the store counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Inserts a value and indexes it against every index.
    ///
    /// Returns `false` without changing anything if the same value is
    /// already contained. A value colliding with another on a unique key
    /// evicts that other value from the store.
    pub fn insert(&self, value: V) -> StoreResult<bool> {
        let _enter = self.span.enter();
        let (result, evicted) = self.state.write(|state| {
            let result = state.insert(value);
            (result, state.take_evicted())
        });
        self.stats.record_evictions(evicted);

        match &result {
            Ok(true) => {
                self.stats.record_insert();
                trace!(evicted, "inserted value");
            }
            Ok(false) => trace!("value already contained"),
            Err(err) => self.extraction_failed(err),
        }
        result
    }

    /// Removes a value from the store and from every index.
    ///
    /// Returns `false` if the value was not contained.
    pub fn remove(&self, value: &V) -> bool {
        let _enter = self.span.enter();
        let removed = self.state.write(|state| state.remove(value));
        if removed {
            self.stats.record_remove();
            trace!("removed value");
        }
        removed
    }

    /// Returns true if the value is contained.
    pub fn contains(&self, value: &V) -> bool {
        self.state.read(|state| state.contains(value))
    }

    /// Returns the number of contained values.
    pub fn len(&self) -> usize {
        self.state.read(StoreState::len)
    }

    /// Returns true if the store holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of defined indices.
    pub fn index_count(&self) -> usize {
        self.state.read(StoreState::index_count)
    }

    /// Creates a non-unique index and backfills it.
    ///
    /// Values for which `extractor` returns `None` are left out of the
    /// index.
    pub fn create_index<K, F>(&self, extractor: F) -> StoreResult<NonUniqueIndex<K, V>>
    where
        K: IndexKey,
        F: Fn(&V) -> Option<K> + Send + Sync + 'static,
    {
        self.register(IndexKind::NonUnique, infallible(extractor))
            .map(NonUniqueIndex::new)
    }

    /// Creates a unique index and backfills it.
    ///
    /// If values already in the store collide on the new key, which of
    /// them survives the backfill is unspecified; do not rely on it.
    pub fn create_unique_index<K, F>(&self, extractor: F) -> StoreResult<UniqueIndex<K, V>>
    where
        K: IndexKey,
        F: Fn(&V) -> Option<K> + Send + Sync + 'static,
    {
        self.register(IndexKind::Unique, infallible(extractor))
            .map(UniqueIndex::new)
    }

    /// Creates a non-unique index from a fallible extractor.
    ///
    /// If the extractor fails during backfill, the index is discarded and
    /// the error is returned.
    pub fn try_create_index<K, E, F>(&self, extractor: F) -> StoreResult<NonUniqueIndex<K, V>>
    where
        K: IndexKey,
        E: Into<KeyExtractionError> + 'static,
        F: Fn(&V) -> Result<Option<K>, E> + Send + Sync + 'static,
    {
        self.register(IndexKind::NonUnique, fallible(extractor))
            .map(NonUniqueIndex::new)
    }

    /// Creates a unique index from a fallible extractor.
    pub fn try_create_unique_index<K, E, F>(&self, extractor: F) -> StoreResult<UniqueIndex<K, V>>
    where
        K: IndexKey,
        E: Into<KeyExtractionError> + 'static,
        F: Fn(&V) -> Result<Option<K>, E> + Send + Sync + 'static,
    {
        self.register(IndexKind::Unique, fallible(extractor))
            .map(UniqueIndex::new)
    }

    /// Returns the value stored under `key`, if any.
    pub fn find_unique<K: IndexKey>(
        &self,
        index: &UniqueIndex<K, V>,
        key: &K,
    ) -> StoreResult<Option<V>> {
        self.stats.record_lookup();
        self.state.read(|state| {
            let table = state.table(index.id())?;
            Ok(table.bucket(key).and_then(ValueSet::first).cloned())
        })
    }

    /// Returns a snapshot of the values stored under `key`.
    pub fn find_by<K: IndexKey>(
        &self,
        index: &NonUniqueIndex<K, V>,
        key: &K,
    ) -> StoreResult<ValueSet<V, S>> {
        self.stats.record_lookup();
        self.state.read(|state| {
            let table = state.table(index.id())?;
            Ok(table.bucket(key).cloned().unwrap_or_default())
        })
    }

    /// Returns a snapshot of all contained values.
    pub fn values(&self) -> ValueSet<V, S> {
        self.state.read(StoreState::values)
    }

    /// Returns the keys that currently have at least one value.
    pub fn key_set<K, I>(&self, index: &I) -> StoreResult<HashSet<K>>
    where
        K: IndexKey,
        I: Index<K, V>,
    {
        self.stats.record_lookup();
        self.state.read(|state| {
            let table = state.table(index.id())?;
            Ok(table.entries::<K>().map(|(k, _)| k.clone()).collect())
        })
    }

    /// Returns a snapshot of key/value pairs of a unique index.
    pub fn unique_entry_set<K: IndexKey>(
        &self,
        index: &UniqueIndex<K, V>,
    ) -> StoreResult<HashMap<K, V>> {
        self.stats.record_lookup();
        self.state.read(|state| {
            let table = state.table(index.id())?;
            Ok(table
                .entries::<K>()
                .filter_map(|(k, bucket)| bucket.first().map(|v| (k.clone(), v.clone())))
                .collect())
        })
    }

    /// Returns a snapshot of key/values pairs of a non-unique index.
    ///
    /// Each value set is its own copy.
    pub fn entry_set<K: IndexKey>(
        &self,
        index: &NonUniqueIndex<K, V>,
    ) -> StoreResult<HashMap<K, ValueSet<V, S>>> {
        self.stats.record_lookup();
        self.state.read(|state| {
            let table = state.table(index.id())?;
            Ok(table
                .entries::<K>()
                .map(|(k, bucket)| (k.clone(), bucket.clone()))
                .collect())
        })
    }

    /// Removes every value. Indices stay defined and answer with empty
    /// results afterwards.
    pub fn clear(&self) {
        let _enter = self.span.enter();
        let removed = self.state.write(|state| {
            let removed = state.len();
            state.clear();
            removed
        });
        debug!(removed, "cleared store");
    }

    /// Checks that the forward table and reverse map agree.
    ///
    /// Meant for tests and diagnostics; it walks every bucket under the
    /// shared lock.
    pub fn verify_integrity(&self) -> StoreResult<()> {
        self.state.read(StoreState::verify)
    }

    /// Reindexes a value under the exclusive lock.
    pub(crate) fn reindex(&self, value: &V) -> StoreResult<bool> {
        let _enter = self.span.enter();
        let (result, evicted) = self.state.write(|state| {
            let result = state.reindex(value);
            (result, state.take_evicted())
        });

        self.stats.record_evictions(evicted);
        match &result {
            Ok(true) => {
                self.stats.record_update();
                trace!(evicted, "reindexed value");
            }
            Ok(false) => trace!("update of a value that is not contained"),
            Err(err) => self.extraction_failed(err),
        }
        result
    }

    fn register<K: IndexKey>(
        &self,
        kind: IndexKind,
        extractor: Box<Extractor<K, V>>,
    ) -> StoreResult<Arc<IndexDescriptor<K, V>>> {
        let _enter = self.span.enter();
        let (result, evicted) = self.state.write(|state| {
            let id = state.allocate_index_id();
            let descriptor = Arc::new(IndexDescriptor::new(id, kind, extractor));
            let erased: Arc<dyn ErasedIndex<V>> = descriptor.clone();
            let result = state
                .register_index(erased)
                .map(|backfilled| (descriptor, backfilled));
            (result, state.take_evicted())
        });
        self.stats.record_index_created();
        self.stats.record_evictions(evicted);

        match result {
            Ok((descriptor, backfilled)) => {
                debug!(index = %descriptor.id(), ?kind, backfilled, evicted, "created index");
                Ok(descriptor)
            }
            Err(err) => {
                self.extraction_failed(&err);
                Err(err)
            }
        }
    }

    fn extraction_failed(&self, err: &StoreError) {
        self.stats.record_extraction_error();
        warn!(error = %err, "key extraction failed");
    }
}

fn infallible<K, V, F>(extractor: F) -> Box<Extractor<K, V>>
where
    K: IndexKey,
    V: 'static,
    F: Fn(&V) -> Option<K> + Send + Sync + 'static,
{
    Box::new(move |value: &V| -> Result<Option<K>, KeyExtractionError> { Ok(extractor(value)) })
}

fn fallible<K, V, E, F>(extractor: F) -> Box<Extractor<K, V>>
where
    K: IndexKey,
    V: 'static,
    E: Into<KeyExtractionError> + 'static,
    F: Fn(&V) -> Result<Option<K>, E> + Send + Sync + 'static,
{
    Box::new(move |value: &V| -> Result<Option<K>, KeyExtractionError> {
        extractor(value).map_err(Into::into)
    })
}

impl<V, S> Default for MultiIndexStore<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: Containment<V>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: Containment<V>> fmt::Debug for MultiIndexStore<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiIndexStore")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct User {
        id: u64,
        first_name: String,
        last_name: Option<String>,
    }

    fn user(id: u64, first: &str, last: &str) -> User {
        User {
            id,
            first_name: first.to_string(),
            last_name: Some(last.to_string()),
        }
    }

    fn john_doe() -> User {
        user(1, "John", "Doe")
    }

    fn jane_doe() -> User {
        user(2, "Jane", "Doe")
    }

    fn robert_smith() -> User {
        user(3, "Robert", "Smith")
    }

    fn first_name(u: &User) -> Option<String> {
        Some(u.first_name.clone())
    }

    fn last_name(u: &User) -> Option<String> {
        u.last_name.clone()
    }

    fn id(u: &User) -> Option<u64> {
        Some(u.id)
    }

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn stores_and_retrieves_values() {
        let store = HashMultiIndexStore::<User>::new();
        let by_first = store.create_index(first_name).unwrap();
        let by_last = store.create_index(last_name).unwrap();
        let by_id = store.create_unique_index(id).unwrap();

        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        store.insert(robert_smith()).unwrap();

        assert_eq!(store.find_unique(&by_id, &1).unwrap(), Some(john_doe()));
        assert_eq!(store.find_unique(&by_id, &2).unwrap(), Some(jane_doe()));
        assert_eq!(store.find_unique(&by_id, &3).unwrap(), Some(robert_smith()));
        assert_eq!(store.find_unique(&by_id, &42).unwrap(), None);

        let johns = store.find_by(&by_first, &s("John")).unwrap();
        assert_eq!(johns.into_vec(), vec![john_doe()]);

        let does = store.find_by(&by_last, &s("Doe")).unwrap();
        assert_eq!(does, [john_doe(), jane_doe()].into_iter().collect());
        assert!(store.find_by(&by_first, &s("Unknown")).unwrap().is_empty());
    }

    #[test]
    fn double_insert_is_a_no_op() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();

        assert!(store.insert(john_doe()).unwrap());
        assert!(!store.insert(john_doe()).unwrap());

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by(&by_last, &s("Doe")).unwrap().len(), 1);
        assert_eq!(store.stats().inserts, 1);
    }

    #[test]
    fn remove_restores_bucket_state() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();
        let by_id = store.create_index(id).unwrap();

        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        assert!(store.contains(&john_doe()));
        assert!(!store.contains(&robert_smith()));

        assert!(store.remove(&john_doe()));
        assert_eq!(
            store.find_by(&by_last, &s("Doe")).unwrap().into_vec(),
            vec![jane_doe()]
        );
        assert!(store.find_by(&by_id, &1).unwrap().is_empty());
        assert!(!store.key_set(&by_id).unwrap().contains(&1));
        assert!(!store.remove(&john_doe()));

        store.remove(&jane_doe());
        assert!(store.key_set(&by_last).unwrap().is_empty());
        store.verify_integrity().unwrap();
    }

    #[test]
    fn index_created_later_is_backfilled() {
        let store = HashMultiIndexStore::<User>::new();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        store.insert(robert_smith()).unwrap();
        store.remove(&robert_smith());

        let by_last = store.create_index(last_name).unwrap();

        assert_eq!(store.find_by(&by_last, &s("Doe")).unwrap().len(), 2);
        assert!(store.find_by(&by_last, &s("Smith")).unwrap().is_empty());

        store.insert(robert_smith()).unwrap();
        assert_eq!(
            store.find_by(&by_last, &s("Smith")).unwrap().into_vec(),
            vec![robert_smith()]
        );
        store.verify_integrity().unwrap();
    }

    #[test]
    fn unique_collision_evicts_from_whole_store() {
        let store = HashMultiIndexStore::<User>::new();
        let by_id = store.create_unique_index(id).unwrap();
        let by_last = store.create_index(last_name).unwrap();

        store.insert(john_doe()).unwrap();
        let johnny = user(1, "Johnny", "Doe");
        store.insert(johnny.clone()).unwrap();

        assert_eq!(store.find_unique(&by_id, &1).unwrap(), Some(johnny.clone()));
        assert_eq!(
            store.find_by(&by_last, &s("Doe")).unwrap().into_vec(),
            vec![johnny]
        );
        assert!(!store.contains(&john_doe()));
        assert_eq!(store.stats().evictions, 1);
        store.verify_integrity().unwrap();
    }

    #[test]
    fn absent_keys_are_excluded_from_index() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();
        let by_first = store.create_index(first_name).unwrap();
        let peter = User {
            id: 10,
            first_name: s("Peter"),
            last_name: None,
        };

        store.insert(john_doe()).unwrap();
        store.insert(peter.clone()).unwrap();

        assert!(store.contains(&peter));
        assert!(store.values().contains(&peter));
        assert_eq!(store.key_set(&by_last).unwrap(), HashSet::from([s("Doe")]));
        assert_eq!(
            store.find_by(&by_first, &s("Peter")).unwrap().into_vec(),
            vec![peter]
        );
    }

    #[test]
    fn rejects_foreign_indices() {
        let store = HashMultiIndexStore::<User>::new();
        let other = HashMultiIndexStore::<User>::new();
        let by_last = other.create_index(last_name).unwrap();
        let by_id = other.create_unique_index(id).unwrap();

        let err = store.find_by(&by_last, &s("Doe")).unwrap_err();
        assert!(matches!(err, StoreError::UnknownIndex { .. }));
        assert_eq!(err.to_string(), "Provided index is not a member of this store");

        assert!(store.find_unique(&by_id, &1).is_err());
        assert!(store.key_set(&by_last).is_err());
        assert!(store.entry_set(&by_last).is_err());
        assert!(store.unique_entry_set(&by_id).is_err());
    }

    #[test]
    fn values_returns_a_copy() {
        let store = HashMultiIndexStore::<User>::new();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();

        let values = store.values();
        store.remove(&john_doe());

        assert_eq!(values.len(), 2);
        assert!(values.contains(&john_doe()));
        assert_eq!(store.values().len(), 1);
    }

    #[test]
    fn returns_key_set() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        store.insert(robert_smith()).unwrap();

        assert_eq!(
            store.key_set(&by_last).unwrap(),
            HashSet::from([s("Doe"), s("Smith")])
        );
    }

    #[test]
    fn enumerations_see_inserted_keys() {
        let store = HashMultiIndexStore::<User>::new();
        let by_id = store.create_unique_index(id).unwrap();
        let by_last = store.create_index(last_name).unwrap();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();

        assert_eq!(store.key_set(&by_last).unwrap(), HashSet::from([s("Doe")]));
        assert_eq!(store.key_set(&by_id).unwrap(), HashSet::from([1, 2]));
        assert_eq!(store.entry_set(&by_last).unwrap()[&s("Doe")].len(), 2);
        assert_eq!(store.unique_entry_set(&by_id).unwrap().len(), 2);
    }

    #[test]
    fn returns_unique_entry_set() {
        let store = HashMultiIndexStore::<User>::new();
        let by_id = store.create_unique_index(id).unwrap();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        store.insert(robert_smith()).unwrap();
        store.remove(&robert_smith());

        assert_eq!(
            store.unique_entry_set(&by_id).unwrap(),
            HashMap::from([(1, john_doe()), (2, jane_doe())])
        );
    }

    #[test]
    fn returns_non_unique_entry_set() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        store.insert(robert_smith()).unwrap();

        let entries = store.entry_set(&by_last).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[&s("Doe")], [john_doe(), jane_doe()].into_iter().collect());
        assert_eq!(entries[&s("Smith")].clone().into_vec(), vec![robert_smith()]);

        store.remove(&john_doe());
        store.remove(&jane_doe());

        let entries = store.entry_set(&by_last).unwrap();
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec![&s("Smith")]);
    }

    #[test]
    fn clear_keeps_indices() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();
        let by_id = store.create_unique_index(id).unwrap();
        store.insert(john_doe()).unwrap();
        store.insert(jane_doe()).unwrap();
        store.insert(robert_smith()).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.index_count(), 2);
        assert!(store.find_by(&by_last, &s("Doe")).unwrap().is_empty());
        assert!(store.entry_set(&by_last).unwrap().is_empty());
        assert_eq!(store.find_unique(&by_id, &1).unwrap(), None);
        assert!(store.unique_entry_set(&by_id).unwrap().is_empty());

        store.insert(john_doe()).unwrap();
        assert_eq!(store.find_unique(&by_id, &1).unwrap(), Some(john_doe()));
    }

    #[test]
    fn failing_extractor_on_insert_propagates() {
        let store = HashMultiIndexStore::<User>::new();
        let by_last = store.create_index(last_name).unwrap();
        let by_first = store
            .try_create_index(|u: &User| {
                if u.first_name.is_empty() {
                    Err("first name missing")
                } else {
                    Ok(Some(u.first_name.clone()))
                }
            })
            .unwrap();

        let nameless = user(7, "", "Doe");
        let err = store.insert(nameless.clone()).unwrap_err();
        assert!(matches!(err, StoreError::KeyExtraction { .. }));

        // Indices before the failing one keep the value.
        assert!(store.contains(&nameless));
        assert!(store.find_by(&by_last, &s("Doe")).unwrap().contains(&nameless));
        assert!(store.key_set(&by_first).unwrap().is_empty());
        assert_eq!(store.stats().extraction_errors, 1);
        store.verify_integrity().unwrap();
    }

    #[test]
    fn stats_are_visible_once_the_call_returns() {
        let store = HashMultiIndexStore::<User>::new();
        store.create_unique_index(id).unwrap();
        store.insert(john_doe()).unwrap();
        store.insert(user(1, "Johnny", "Doe")).unwrap();
        store.remove(&user(1, "Johnny", "Doe"));

        let stats = store.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.removes, 1);
        assert_eq!(stats.indexes_created, 1);
    }

    #[test]
    fn failing_backfill_drops_the_index() {
        let store = HashMultiIndexStore::<User>::new();
        store.insert(john_doe()).unwrap();
        store.insert(user(8, "", "Nobody")).unwrap();

        let result = store.try_create_unique_index(|u: &User| {
            if u.first_name.is_empty() {
                Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "empty"))
            } else {
                Ok(Some(u.first_name.clone()))
            }
        });

        assert!(matches!(result, Err(StoreError::KeyExtraction { .. })));
        assert_eq!(store.index_count(), 0);
        assert_eq!(store.len(), 2);

        // Later inserts do not run the discarded extractor.
        store.insert(user(9, "", "Other")).unwrap();
        store.verify_integrity().unwrap();
    }

    #[test]
    fn handles_report_kind_and_key() {
        let store = HashMultiIndexStore::<User>::new();
        let by_id = store.create_unique_index(id).unwrap();
        let by_last = store.create_index(last_name).unwrap();

        assert_eq!(by_id.kind(), IndexKind::Unique);
        assert_eq!(by_last.kind(), IndexKind::NonUnique);
        assert_eq!(by_id.id().store(), store.id());
        assert_eq!(by_id.get_key(&john_doe()).unwrap(), Some(1));
        assert!(by_id.id().serial() < by_last.id().serial());
    }

    #[test]
    fn config_is_kept() {
        let store: HashMultiIndexStore<User> =
            MultiIndexStore::with_config(StoreConfig::new().name("users").initial_capacity(16));
        assert_eq!(store.config().name, "users");
        assert!(format!("{store:?}").contains("users"));
    }

    #[test]
    fn concurrent_insert_find_remove() {
        let store = Arc::new(HashMultiIndexStore::<User>::new());
        let by_last = store.create_index(last_name).unwrap();
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let handles: Vec<_> = [john_doe(), jane_doe()]
            .into_iter()
            .map(|u| {
                let store = Arc::clone(&store);
                let by_last = by_last.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let last = u.last_name.clone().unwrap();
                    for _ in 0..100 {
                        store.insert(u.clone()).unwrap();
                        assert!(store.find_by(&by_last, &last).unwrap().contains(&u));
                        assert!(store.contains(&u));

                        store.remove(&u);
                        assert!(!store.find_by(&by_last, &last).unwrap().contains(&u));
                        assert!(!store.contains(&u));

                        barrier.wait();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(store.is_empty());
        store.verify_integrity().unwrap();
    }
}
