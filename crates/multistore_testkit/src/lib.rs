//! # Multistore Testkit
//!
//! Test utilities for multistore.
//!
//! This crate provides:
//! - Sample users and preconfigured stores
//! - Property-based test generators using proptest
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust,ignore
//! use multistore_testkit::prelude::*;
//!
//! #[test]
//! fn finds_does() {
//!     let fixture = UserStore::new();
//!     fixture.store.insert(john_doe()).unwrap();
//!     assert_eq!(fixture.by_last_name("Doe").len(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
