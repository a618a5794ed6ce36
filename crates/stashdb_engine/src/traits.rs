//! Storage engine boundary traits.
//!
//! The engine is an external collaborator: it owns durability, ACID
//! guarantees and the on-disk representation. This module fixes the
//! contract the client layer drives:
//!
//! - versioned open with a one-time upgrade window for schema changes
//! - per-storage transactions scoped to an access mode
//! - ascending bulk range reads, single-key read/write/delete
//! - forward/reverse cursors over the primary key or a named index
//! - whole-database deletion that fails as blocked while other
//!   connections remain open
//!
//! # Invariants
//!
//! - Bulk reads return records in ascending key order
//! - Assigned primary keys are monotonic and never reused
//! - Index scans break key ties by primary-key order
//!
//! # Implementors
//!
//! - [`crate::MemoryEngine`] - in-memory reference engine

use crate::error::EngineResult;
use crate::key::{IdRange, KeyRange};
use crate::record::{Document, RecordId};
use std::sync::Arc;

/// Access mode of a storage-scoped transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Reads only; writes are rejected.
    ReadOnly,
    /// Reads and writes.
    ReadWrite,
}

/// Traversal direction of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending key order.
    Forward,
    /// Descending key order.
    Reverse,
}

/// What a cursor iterates over.
#[derive(Debug, Clone)]
pub enum CursorSource {
    /// The primary-key space, constrained to a key range.
    Primary(IdRange),
    /// A named index, constrained to a key range.
    Index {
        /// Index name.
        name: String,
        /// Range over indexed keys.
        range: KeyRange,
    },
}

/// Schema operations available during the upgrade window.
///
/// The engine hands an editor to the upgrade hook exactly once per
/// version change; outside that window schema mutations go through
/// [`Connection`].
pub trait SchemaEditor {
    /// Version recorded before this open.
    fn old_version(&self) -> u32;

    /// Version being upgraded to.
    fn new_version(&self) -> u32;

    /// Whether a storage already exists.
    fn has_store(&self, name: &str) -> bool;

    /// Creates a storage with an auto-increment primary key.
    fn create_store(&mut self, name: &str) -> EngineResult<()>;

    /// Creates a secondary index over one record field.
    fn create_index(
        &mut self,
        store: &str,
        index: &str,
        field: &str,
        unique: bool,
    ) -> EngineResult<()>;
}

/// Upgrade hook invoked while the engine holds the upgrade window open.
pub type UpgradeHook<'a> = dyn FnMut(&mut dyn SchemaEditor) -> EngineResult<()> + 'a;

/// A storage engine: the entry point for opening and deleting databases.
pub trait StorageEngine: Send + Sync {
    /// Opens a database by name.
    ///
    /// With `version = None` the engine keeps the stored version (1 for a
    /// fresh database). A higher requested version, or a fresh database,
    /// runs `on_upgrade` inside the upgrade window before the connection
    /// is handed out; a lower one fails with
    /// [`EngineError::VersionRegression`](crate::EngineError::VersionRegression).
    fn open(
        &self,
        name: &str,
        version: Option<u32>,
        on_upgrade: &mut UpgradeHook<'_>,
    ) -> EngineResult<Arc<dyn Connection>>;

    /// Deletes a whole database.
    ///
    /// Fails with [`EngineError::Blocked`](crate::EngineError::Blocked)
    /// while any connection to it remains open. Deleting a database that
    /// does not exist succeeds.
    fn delete_database(&self, name: &str) -> EngineResult<()>;
}

/// An open connection to one database.
pub trait Connection: Send + Sync {
    /// Name of the connected database.
    fn database_name(&self) -> &str;

    /// Version the database is currently at.
    fn version(&self) -> u32;

    /// Names of all storages, in name order.
    fn store_names(&self) -> Vec<String>;

    /// Creates a storage outside the upgrade window.
    fn create_store(&self, name: &str) -> EngineResult<()>;

    /// Deletes a storage. Deleting a missing storage succeeds.
    fn delete_store(&self, name: &str) -> EngineResult<()>;

    /// Opens a transaction scoped to one storage.
    fn transaction(&self, store: &str, mode: AccessMode) -> EngineResult<Box<dyn StoreHandle>>;

    /// Closes the connection. Further use fails with
    /// [`EngineError::Closed`](crate::EngineError::Closed).
    fn close(&self);
}

/// A storage handle scoped to one transaction.
pub trait StoreHandle {
    /// Reads a single record by primary key.
    fn get(&self, id: RecordId) -> EngineResult<Option<Document>>;

    /// Bulk range read over the primary-key space, ascending, capped at
    /// `count` when given.
    fn get_range(&self, range: &IdRange, count: Option<usize>) -> EngineResult<Vec<Document>>;

    /// Bulk range read over a named index, ascending by indexed key with
    /// ties in primary-key order, capped at `count` when given.
    fn index_range(
        &self,
        index: &str,
        range: &KeyRange,
        count: Option<usize>,
    ) -> EngineResult<Vec<Document>>;

    /// Writes a new record, assigning the next primary key.
    ///
    /// Any caller-supplied [`KEY_FIELD`](crate::KEY_FIELD) entry is
    /// overwritten with the assigned key.
    fn insert(&self, doc: Document) -> EngineResult<RecordId>;

    /// Replaces the record at `id` entirely (upsert).
    fn put(&self, id: RecordId, doc: Document) -> EngineResult<()>;

    /// Deletes the record at `id`. Deleting a missing key succeeds.
    fn delete(&self, id: RecordId) -> EngineResult<()>;

    /// Opens a cursor over the primary key or a named index.
    fn open_cursor(
        &self,
        source: CursorSource,
        direction: Direction,
    ) -> EngineResult<Box<dyn Cursor>>;
}

/// A stateful iterator over a key range, advanced one record at a time.
pub trait Cursor {
    /// Advances to the next record and returns it, or `None` when the
    /// range is exhausted.
    fn advance(&mut self) -> EngineResult<Option<Document>>;

    /// Deletes the record the cursor currently rests on.
    ///
    /// Fails with
    /// [`EngineError::InvalidCursor`](crate::EngineError::InvalidCursor)
    /// before the first `advance` or after exhaustion.
    fn delete_current(&mut self) -> EngineResult<()>;
}
