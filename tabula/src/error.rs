//! Error types

use crate::key::RowKey;

/// Errors reported by the table pipeline.
///
/// Most pipeline stages are infallible; these cover the caller contract
/// violations that can be detected cheaply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two visible rows resolved to the same key.
    #[error("Duplicate row key '{key}' at rows {first} and {second}")]
    DuplicateKey {
        key: RowKey,
        /// Source position of the first row with this key.
        first: usize,
        /// Source position of the colliding row.
        second: usize,
    },

    /// A page size of zero was requested.
    #[error("Page size must be greater than zero")]
    InvalidPageSize,
}

impl TableError {
    /// Creates a new duplicate key error.
    pub fn duplicate_key(key: RowKey, first: usize, second: usize) -> Self {
        Self::DuplicateKey { key, first, second }
    }
}

/// Result alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
