//! Error types for multistore.

use crate::types::IndexId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error produced by a fallible key extractor.
pub type KeyExtractionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The index handle was not created by this store.
    #[error("Provided index is not a member of this store")]
    UnknownIndex {
        /// The foreign index.
        index: IndexId,
    },

    /// A key extractor failed while indexing a value.
    ///
    /// Indices processed before the failing one may already reflect the
    /// operation; see the crate docs for the exact post-state.
    #[error("key extraction failed for {index}: {source}")]
    KeyExtraction {
        /// The index whose extractor failed.
        index: IndexId,
        /// Error returned by the extractor.
        #[source]
        source: KeyExtractionError,
    },

    /// Forward table and reverse map disagree.
    #[error("store is inconsistent: {message}")]
    Inconsistent {
        /// Description of the violation.
        message: String,
    },
}

impl StoreError {
    /// Creates an unknown index error.
    pub fn unknown_index(index: IndexId) -> Self {
        Self::UnknownIndex { index }
    }

    /// Creates a key extraction error.
    pub fn key_extraction(index: IndexId, source: KeyExtractionError) -> Self {
        Self::KeyExtraction { index, source }
    }

    /// Creates an inconsistency error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }
}
