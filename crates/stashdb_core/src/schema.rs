//! Schema descriptor.
//!
//! A [`Schema`] names the database, its version, its storages and the
//! secondary indexes per storage. It is plain data: the client hands it
//! to the engine's upgrade window during `init`, where missing storages
//! and their indexes are created. Changing it afterwards requires a
//! version bump and a fresh open, matching the engine's
//! versioned-migration model.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declaration of one secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDecl {
    /// Index name, unique within its storage.
    pub name: String,
    /// Record field the index is built over.
    pub field: String,
    /// Whether the index enforces key uniqueness.
    #[serde(default)]
    pub unique: bool,
}

/// Schema descriptor for one database.
///
/// Built with the chaining constructors:
///
/// ```rust
/// use stashdb_core::Schema;
///
/// let schema = Schema::new("app")
///     .version(1)
///     .storage("tasks")
///     .index("tasks", "tasksName", "name");
/// assert!(schema.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Database name.
    pub name: String,
    /// Database version; `None` leaves the choice to the engine.
    #[serde(default)]
    pub version: Option<u32>,
    /// Declared storage names, in declaration order.
    #[serde(default)]
    pub storages: Vec<String>,
    /// Index declarations per storage.
    #[serde(default)]
    pub indexes: BTreeMap<String, Vec<IndexDecl>>,
}

impl Schema {
    /// Creates a schema for the named database.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            storages: Vec::new(),
            indexes: BTreeMap::new(),
        }
    }

    /// Sets the database version.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Declares a storage.
    #[must_use]
    pub fn storage(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.storages.contains(&name) {
            self.storages.push(name);
        }
        self
    }

    /// Declares a non-unique index on a storage.
    #[must_use]
    pub fn index(
        self,
        storage: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.add_index(storage, name, field, false)
    }

    /// Declares a unique index on a storage.
    #[must_use]
    pub fn unique_index(
        self,
        storage: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.add_index(storage, name, field, true)
    }

    fn add_index(
        mut self,
        storage: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
        unique: bool,
    ) -> Self {
        self.indexes.entry(storage.into()).or_default().push(IndexDecl {
            name: name.into(),
            field: field.into(),
            unique,
        });
        self
    }

    /// Checks the descriptor's internal invariants.
    ///
    /// Every storage referenced by an index declaration must be declared,
    /// index names must be unique per storage, the database name must be
    /// non-empty and the version, when given, positive.
    pub fn validate(&self) -> ClientResult<()> {
        if self.name.is_empty() {
            return Err(ClientError::invalid_schema("database name is empty"));
        }
        if self.version == Some(0) {
            return Err(ClientError::invalid_schema("version must be positive"));
        }
        for (storage, decls) in &self.indexes {
            if !self.storages.contains(storage) {
                return Err(ClientError::invalid_schema(format!(
                    "index declared on undeclared storage {storage}"
                )));
            }
            for (i, decl) in decls.iter().enumerate() {
                if decl.name.is_empty() {
                    return Err(ClientError::invalid_schema(format!(
                        "empty index name on storage {storage}"
                    )));
                }
                if decls[..i].iter().any(|d| d.name == decl.name) {
                    return Err(ClientError::invalid_schema(format!(
                        "duplicate index {} on storage {storage}",
                        decl.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Index declarations for a storage, empty when none are declared.
    #[must_use]
    pub fn indexes_for(&self, storage: &str) -> &[IndexDecl] {
        self.indexes.get(storage).map_or(&[], Vec::as_slice)
    }

    /// Whether a storage declares the named index.
    #[must_use]
    pub fn has_index(&self, storage: &str, index: &str) -> bool {
        self.indexes_for(storage).iter().any(|d| d.name == index)
    }
}
