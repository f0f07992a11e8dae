//! Property-based test generators using proptest.
//!
//! Ids and names are drawn from small pools so that generated operations
//! actually collide on unique keys and share non-unique buckets.

use crate::fixtures::User;
use multistore_core::{HashMultiIndexStore, NonUniqueIndex, StoreResult, UniqueIndex};
use proptest::prelude::*;
use std::collections::HashMap;

/// Strategy for user ids from a small pool.
pub fn id_strategy() -> impl Strategy<Value = u64> {
    0u64..8
}

/// Strategy for first names.
pub fn first_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["John", "Jane", "Robert", "Peter"]).prop_map(str::to_string)
}

/// Strategy for optional last names; `None` is generated regularly.
pub fn last_name_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(
        0.8,
        prop::sample::select(vec!["Doe", "Smith", "Miller"]).prop_map(str::to_string),
    )
}

/// Strategy for users.
pub fn user_strategy() -> impl Strategy<Value = User> {
    (id_strategy(), first_name_strategy(), last_name_strategy()).prop_map(
        |(id, first_name, last_name)| User {
            id,
            first_name,
            last_name,
        },
    )
}

/// A store operation.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert a user.
    Insert(User),
    /// Remove a user.
    Remove(User),
    /// Remove every user.
    Clear,
}

/// Strategy for a single operation, biased towards inserts.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        6 => user_strategy().prop_map(Operation::Insert),
        3 => user_strategy().prop_map(Operation::Remove),
        1 => Just(Operation::Clear),
    ]
}

/// Strategy for a sequence of operations.
pub fn operations_strategy(max_len: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), 0..max_len)
}

/// Reference model of a store with a unique index on `id`.
///
/// The unique index makes the store contents a map from id to user: an
/// insert replaces whichever user held the id.
#[derive(Debug, Default)]
pub struct UserModel {
    users: HashMap<u64, User>,
}

impl UserModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an operation, returning what the store should answer for it.
    pub fn apply(&mut self, op: &Operation) -> bool {
        match op {
            Operation::Insert(user) => {
                if self.users.get(&user.id) == Some(user) {
                    return false;
                }
                self.users.insert(user.id, user.clone());
                true
            }
            Operation::Remove(user) => {
                if self.users.get(&user.id) == Some(user) {
                    self.users.remove(&user.id);
                    true
                } else {
                    false
                }
            }
            Operation::Clear => {
                self.users.clear();
                true
            }
        }
    }

    /// Returns the user holding `id`.
    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if the model is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Returns the users with the given last name.
    pub fn with_last_name(&self, last_name: &str) -> Vec<&User> {
        self.users
            .values()
            .filter(|u| u.last_name.as_deref() == Some(last_name))
            .collect()
    }

    /// Iterates over all users.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

/// Applies an operation to a store, returning the store's answer.
///
/// `Clear` always answers `true`, like the model.
pub fn apply_to_store(store: &HashMultiIndexStore<User>, op: &Operation) -> StoreResult<bool> {
    match op {
        Operation::Insert(user) => store.insert(user.clone()),
        Operation::Remove(user) => Ok(store.remove(user)),
        Operation::Clear => {
            store.clear();
            Ok(true)
        }
    }
}

/// Indices used by model-based tests.
pub struct ModelIndices {
    /// Unique index on `id`.
    pub id: UniqueIndex<u64, User>,
    /// Non-unique index on `last_name`.
    pub last_name: NonUniqueIndex<String, User>,
}

impl ModelIndices {
    /// Creates both indices on `store`.
    pub fn create(store: &HashMultiIndexStore<User>) -> StoreResult<Self> {
        Ok(Self {
            id: store.create_unique_index(User::id_key)?,
            last_name: store.create_index(User::last_name_key)?,
        })
    }
}
