//! # StashDB Core
//!
//! A typed client-side query layer over a transactional key-value
//! engine. Application code gets a declarative, chainable surface
//! (select a storage, filter/sort/limit, mutate) instead of driving the
//! engine's transactions and cursors directly.
//!
//! This crate provides:
//! - Schema configuration and versioned storage/index creation
//! - Strategy-based selection (primary or index, bulk or cursor)
//! - Insert, keyed update and index-scoped deletion
//! - A uniform completion contract with a classified error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use stashdb_core::{Schema, Selection, Stash};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Task {
//!     #[serde(default)]
//!     id: u64,
//!     name: String,
//! }
//!
//! let stash = Stash::in_memory();
//! stash
//!     .configure(
//!         Schema::new("app")
//!             .version(1)
//!             .storage("tasks")
//!             .index("tasks", "tasksName", "name"),
//!     )?
//!     .init()?;
//!
//! let tasks = stash.from("tasks");
//! tasks.insert(&Task { id: 0, name: "laundry".into() })?;
//! tasks.insert(&Task { id: 0, name: "dishes".into() })?;
//!
//! let by_name: Vec<Task> =
//!     tasks.select(Selection::index("tasksName").value("dishes"))?;
//! assert_eq!(by_name.len(), 1);
//! # Ok::<(), stashdb_core::ClientError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod mutate;
mod query;
mod request;
mod schema;
mod selection;

pub use client::{Selected, Stash};
pub use error::{ClientError, ClientResult};
pub use query::Strategy;
pub use schema::{IndexDecl, Schema};
pub use selection::{KeySpace, Order, Selection, ValueSelector};

pub use stashdb_engine::{Document, MemoryEngine, RecordId, Scalar, StorageEngine};
