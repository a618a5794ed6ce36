//! Error types for client operations.

use stashdb_engine::EngineError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the client layer.
///
/// Precondition errors are raised before any engine request is issued;
/// engine errors propagate through the request bridge unmodified apart
/// from the two classified kinds ([`Conflict`](ClientError::Conflict) and
/// [`Blocked`](ClientError::Blocked)). Nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No schema has been supplied via `configure`.
    #[error("client is not configured: call configure() with a schema first")]
    NotConfigured,

    /// The connection has not been opened via `init`.
    #[error("client is not initialized: call init() first")]
    NotInitialized,

    /// An operation ran without a prior `from` call.
    #[error("no storage selected: call from() before querying or mutating")]
    NoStorageSelected,

    /// Explicit storage creation hit an existing storage.
    #[error("storage already exists: {name}")]
    StorageExists {
        /// Name of the existing storage.
        name: String,
    },

    /// The selection names an index the schema does not declare.
    #[error("unknown index {index} on storage {storage}")]
    UnknownIndex {
        /// The targeted storage.
        storage: String,
        /// The undeclared index name.
        index: String,
    },

    /// The schema descriptor is internally inconsistent.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// What is wrong with the descriptor.
        message: String,
    },

    /// The selection descriptor cannot be executed.
    #[error("invalid selection: {message}")]
    InvalidDescriptor {
        /// What is wrong with the descriptor.
        message: String,
    },

    /// The record is not an object, or cannot be serialized as one.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// What is wrong with the record.
        message: String,
    },

    /// An update was issued on a record with no primary key.
    #[error("record carries no primary key; update requires one")]
    MissingKey,

    /// A write collided with an existing key in a unique index.
    #[error("conflict on unique index {index}: key {key}")]
    Conflict {
        /// Name of the violated index.
        index: String,
        /// Display form of the colliding key.
        key: String,
    },

    /// Database deletion is blocked by another open connection.
    #[error("database deletion blocked: {name}")]
    Blocked {
        /// Name of the database.
        name: String,
    },

    /// Any other engine failure, propagated unmodified.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl ClientError {
    /// Creates an invalid-schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an invalid-descriptor error.
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Creates an invalid-record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates an unknown-index error.
    pub fn unknown_index(storage: impl Into<String>, index: impl Into<String>) -> Self {
        Self::UnknownIndex {
            storage: storage.into(),
            index: index.into(),
        }
    }
}
