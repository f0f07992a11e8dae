//! Index descriptors and keys.
//!
//! An index is created by a store from a key-extraction function and is
//! only valid against that store. Callers hold typed handles:
//!
//! - [`UniqueIndex`]: at most one value per key
//! - [`NonUniqueIndex`]: any number of values per key
//!
//! The store keeps the descriptors type-erased so that indices with
//! different key types share one forward table.

mod descriptor;
mod key;

pub(crate) use descriptor::{ErasedIndex, Extractor, IndexDescriptor};
pub use descriptor::{Index, IndexKind, NonUniqueIndex, UniqueIndex};
pub(crate) use key::{probe, ErasedKey};
pub use key::IndexKey;
