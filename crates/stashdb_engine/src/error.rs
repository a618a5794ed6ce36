//! Error types for engine operations.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by a storage engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The named storage does not exist.
    #[error("unknown storage: {name}")]
    UnknownStore {
        /// Name of the missing storage.
        name: String,
    },

    /// A storage with this name already exists.
    #[error("storage already exists: {name}")]
    StoreExists {
        /// Name of the existing storage.
        name: String,
    },

    /// The named index does not exist on the storage.
    #[error("unknown index {index} on storage {store}")]
    UnknownIndex {
        /// Storage that was searched.
        store: String,
        /// Name of the missing index.
        index: String,
    },

    /// An index with this name already exists on the storage.
    #[error("index already exists: {index} on storage {store}")]
    IndexExists {
        /// Storage holding the index.
        store: String,
        /// Name of the existing index.
        index: String,
    },

    /// A unique index already holds this key for another record.
    #[error("unique index violation on {index}: key {key}")]
    UniqueViolation {
        /// Name of the violated index.
        index: String,
        /// Display form of the colliding key.
        key: String,
    },

    /// A write was attempted through a read-only transaction.
    #[error("write through read-only transaction: {operation}")]
    ReadOnly {
        /// The rejected operation.
        operation: &'static str,
    },

    /// The database was opened at a version below the stored one.
    #[error("version regression: stored {stored}, requested {requested}")]
    VersionRegression {
        /// Version currently recorded by the engine.
        stored: u32,
        /// Version the caller asked for.
        requested: u32,
    },

    /// Database deletion is blocked by other open connections.
    #[error("database deletion blocked: {name} has open connections")]
    Blocked {
        /// Name of the database that could not be deleted.
        name: String,
    },

    /// The connection has been closed.
    #[error("connection is closed")]
    Closed,

    /// A cursor operation was issued with no current record.
    #[error("cursor has no current record")]
    InvalidCursor,
}

impl EngineError {
    /// Creates an unknown-storage error.
    pub fn unknown_store(name: impl Into<String>) -> Self {
        Self::UnknownStore { name: name.into() }
    }

    /// Creates a storage-exists error.
    pub fn store_exists(name: impl Into<String>) -> Self {
        Self::StoreExists { name: name.into() }
    }

    /// Creates an unknown-index error.
    pub fn unknown_index(store: impl Into<String>, index: impl Into<String>) -> Self {
        Self::UnknownIndex {
            store: store.into(),
            index: index.into(),
        }
    }

    /// Creates a unique-violation error.
    pub fn unique_violation(index: impl Into<String>, key: impl std::fmt::Display) -> Self {
        Self::UniqueViolation {
            index: index.into(),
            key: key.to_string(),
        }
    }

    /// Creates a blocked-deletion error.
    pub fn blocked(name: impl Into<String>) -> Self {
        Self::Blocked { name: name.into() }
    }
}
