//! Test fixtures and store helpers.
//!
//! Provides the sample users used across the test suites and a store
//! preconfigured with the usual indices.

use multistore_core::{
    Equality, HashMultiIndexStore, IdentityMultiIndexStore, NonUniqueIndex, StoreConfig,
    UniqueIndex, ValueSet,
};
use parking_lot::RwLock;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

/// A sample record with an optional last name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    /// Numeric identifier, used as unique key.
    pub id: u64,
    /// First name.
    pub first_name: String,
    /// Last name; `None` keeps the user out of last-name indices.
    pub last_name: Option<String>,
}

impl User {
    /// Creates a user with a last name.
    pub fn new(id: u64, first_name: &str, last_name: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: Some(last_name.to_string()),
        }
    }

    /// Creates a user without a last name.
    pub fn without_last_name(id: u64, first_name: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: None,
        }
    }

    /// Extracts the id.
    pub fn id_key(&self) -> Option<u64> {
        Some(self.id)
    }

    /// Extracts the first name.
    pub fn first_name_key(&self) -> Option<String> {
        Some(self.first_name.clone())
    }

    /// Extracts the last name, if any.
    pub fn last_name_key(&self) -> Option<String> {
        self.last_name.clone()
    }
}

/// John Doe, id 1.
pub fn john_doe() -> User {
    User::new(1, "John", "Doe")
}

/// Jane Doe, id 2.
pub fn jane_doe() -> User {
    User::new(2, "Jane", "Doe")
}

/// An equal but separately built John Doe.
pub fn john_doe_copy() -> User {
    User::new(1, "John", "Doe")
}

/// Robert Smith, id 3.
pub fn robert_smith() -> User {
    User::new(3, "Robert", "Smith")
}

/// Peter, id 10, without a last name.
pub fn peter() -> User {
    User::without_last_name(10, "Peter")
}

/// A user behind a lock, for identity stores.
pub type SharedUser = Arc<RwLock<User>>;

/// Wraps a user for an identity store.
pub fn shared(user: User) -> SharedUser {
    Arc::new(RwLock::new(user))
}

/// A hash store with the three standard user indices.
pub struct UserStore {
    /// The store instance.
    pub store: HashMultiIndexStore<User>,
    /// Unique index on `id`.
    pub id: UniqueIndex<u64, User>,
    /// Non-unique index on `first_name`.
    pub first_name: NonUniqueIndex<String, User>,
    /// Non-unique index on `last_name`.
    pub last_name: NonUniqueIndex<String, User>,
}

impl UserStore {
    /// Creates an empty store with its indices.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::new().name("users"))
    }

    /// Creates an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let store = HashMultiIndexStore::with_config(config);
        let id = store
            .create_unique_index(User::id_key)
            .expect("Failed to create id index");
        let first_name = store
            .create_index(User::first_name_key)
            .expect("Failed to create first name index");
        let last_name = store
            .create_index(User::last_name_key)
            .expect("Failed to create last name index");
        Self {
            store,
            id,
            first_name,
            last_name,
        }
    }

    /// Looks up users by last name.
    pub fn by_last_name(&self, last_name: &str) -> ValueSet<User, Equality> {
        self.store
            .find_by(&self.last_name, &last_name.to_string())
            .expect("Index belongs to this store")
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for UserStore {
    type Target = HashMultiIndexStore<User>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// An identity store of shared users with the last-name index.
pub struct SharedUserStore {
    /// The store instance.
    pub store: IdentityMultiIndexStore<RwLock<User>>,
    /// Non-unique index on `last_name`.
    pub last_name: NonUniqueIndex<String, SharedUser>,
}

impl SharedUserStore {
    /// Creates an empty identity store with its index.
    pub fn new() -> Self {
        let store = IdentityMultiIndexStore::new();
        let last_name = store
            .create_index(|u: &SharedUser| u.read().last_name.clone())
            .expect("Failed to create last name index");
        Self { store, last_name }
    }
}

impl Default for SharedUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedUserStore {
    type Target = IdentityMultiIndexStore<RwLock<User>>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

static TRACING: Once = Once::new();

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, once per process.
///
/// Defaults to `warn` when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
