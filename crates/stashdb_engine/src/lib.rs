//! # StashDB Engine
//!
//! Storage engine boundary and reference engine for StashDB.
//!
//! This crate fixes the contract between the client query layer and the
//! host storage engine. The engine owns durability, transactions and the
//! persisted representation; the client drives it through the traits
//! defined here:
//!
//! - [`StorageEngine`] - versioned open and whole-database deletion
//! - [`Connection`] - storage management and per-storage transactions
//! - [`StoreHandle`] - reads, writes and cursors within one transaction
//! - [`Cursor`] - stepwise traversal in forward or reverse key order
//! - [`SchemaEditor`] - schema changes inside the upgrade window
//!
//! ## Reference engine
//!
//! [`MemoryEngine`] implements the whole contract in process memory, for
//! tests and ephemeral databases.
//!
//! ## Example
//!
//! ```rust
//! use stashdb_engine::{
//!     AccessMode, Connection, MemoryEngine, SchemaEditor, StorageEngine, StoreHandle,
//! };
//!
//! let engine = MemoryEngine::new();
//! let conn = engine
//!     .open("app", None, &mut |editor| editor.create_store("tasks"))
//!     .unwrap();
//!
//! let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();
//! let mut doc = stashdb_engine::Document::new();
//! doc.insert("name".into(), "laundry".into());
//! let id = txn.insert(doc).unwrap();
//! assert_eq!(id.as_u64(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod key;
mod memory;
mod record;
mod traits;

pub use error::{EngineError, EngineResult};
pub use key::{IdRange, KeyRange, Scalar};
pub use memory::MemoryEngine;
pub use record::{record_id, set_record_id, Document, RecordId, KEY_FIELD};
pub use traits::{
    AccessMode, Connection, Cursor, CursorSource, Direction, SchemaEditor, StorageEngine,
    StoreHandle, UpgradeHook,
};
