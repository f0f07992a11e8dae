//! Store engine.
//!
//! [`MultiIndexStore`] is the public facade: it takes the guard, delegates
//! to the forward/reverse bookkeeping in `state`, and copies results out.

mod multi;
mod mutable;
mod state;

pub use multi::{HashMultiIndexStore, IdentityMultiIndexStore, MultiIndexStore};
