//! # multistore core
//!
//! Thread-safe in-memory value store with secondary indices.
//!
//! This crate provides:
//! - A store of values that can be looked up through any number of indices
//! - Unique and non-unique indices derived from key-extraction functions
//! - Indices created at any time and backfilled over existing values
//! - Two containment flavors: domain equality and reference identity
//! - One shared/exclusive lock per store guarding all index bookkeeping
//!
//! ## Usage
//!
//! ```rust,ignore
//! use multistore_core::{HashMultiIndexStore, StoreResult};
//!
//! fn run() -> StoreResult<()> {
//!     let store = HashMultiIndexStore::<User>::new();
//!     let by_last_name = store.create_index(|u: &User| u.last_name.clone())?;
//!     let by_id = store.create_unique_index(|u: &User| Some(u.id))?;
//!
//!     store.insert(john)?;
//!     store.insert(jane)?;
//!
//!     let does = store.find_by(&by_last_name, &"Doe".to_string())?;
//!     let john = store.find_unique(&by_id, &1)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Unique keys
//!
//! Indexing a value under a unique key that another value already holds
//! evicts that other value from the whole store, not just from the one
//! index. Backfilling a new unique index over values that already collide
//! is unspecified: one of them survives, which one is not defined.
//!
//! ## Absent keys
//!
//! An extractor returning `None` leaves the value out of that index. The
//! value is still contained and still reachable through other indices and
//! [`MultiIndexStore::values`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod containment;
pub mod error;
mod guard;
pub mod index;
pub mod stats;
mod store;
pub mod types;

pub use config::StoreConfig;
pub use containment::{Containment, Equality, Identity, ValueMap, ValueSet};
pub use error::{KeyExtractionError, StoreError, StoreResult};
pub use index::{Index, IndexKey, IndexKind, NonUniqueIndex, UniqueIndex};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::{HashMultiIndexStore, IdentityMultiIndexStore, MultiIndexStore};
pub use types::{IndexId, StoreId};
