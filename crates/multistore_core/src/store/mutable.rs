//! Reindexing for stores of shared, mutable values.

use crate::containment::Identity;
use crate::error::StoreResult;
use crate::store::multi::MultiIndexStore;
use std::sync::Arc;

impl<T> MultiIndexStore<Arc<T>, Identity>
where
    T: ?Sized + Send + Sync + 'static,
{
    /// Recomputes the index memberships of a value after it was mutated.
    ///
    /// Behaves like `remove` followed by `insert`, but as one exclusive
    /// operation during which the value never stops being contained.
    /// Readers see the value either in its old buckets or in its new ones.
    ///
    /// Only the index switch is atomic. Synchronizing the mutation of the
    /// value itself is up to the caller.
    ///
    /// Returns `false`, inserting nothing, if the value is not contained.
    pub fn update(&self, value: &Arc<T>) -> StoreResult<bool> {
        self.reindex(value)
    }
}
