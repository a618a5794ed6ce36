//! Client facade and lifecycle.
//!
//! [`Stash`] owns the one live connection, the configured schema and the
//! selection context. The context is the single piece of shared mutable
//! state: `from` sets it, every operation clears it on completion,
//! success or failure alike. Interleaving two unawaited chains between
//! `from` and the operation can overwrite the target; the [`Selected`]
//! handle returned by `from` carries the target by value and is immune
//! to that.

use crate::error::{ClientError, ClientResult};
use crate::mutate;
use crate::query;
use crate::request::{self, ContextGuard};
use crate::schema::Schema;
use crate::selection::Selection;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use stashdb_engine::{
    Connection, Document, EngineResult, MemoryEngine, RecordId, SchemaEditor, StorageEngine,
};
use std::sync::Arc;

/// A typed query client over one database.
///
/// # Example
///
/// ```rust
/// use stashdb_core::{Schema, Selection, Stash};
/// use serde_json::json;
///
/// let stash = Stash::in_memory();
/// stash
///     .configure(
///         Schema::new("app")
///             .storage("tasks")
///             .index("tasks", "tasksName", "name"),
///     )
///     .unwrap()
///     .init()
///     .unwrap();
///
/// let tasks = stash.from("tasks");
/// tasks.insert(&json!({"name": "laundry"})).unwrap();
/// let all: Vec<serde_json::Value> = tasks.select(Selection::all()).unwrap();
/// assert_eq!(all.len(), 1);
/// ```
pub struct Stash {
    /// The host storage engine.
    engine: Arc<dyn StorageEngine>,
    /// Active schema descriptor.
    schema: RwLock<Option<Schema>>,
    /// The one live connection handle.
    conn: RwLock<Option<Arc<dyn Connection>>>,
    /// Whether `init` has completed.
    inited: RwLock<bool>,
    /// Selection context: the storage the next operation targets.
    selected: RwLock<Option<String>>,
}

impl Stash {
    /// Creates a client over the given engine.
    #[must_use]
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self {
            engine,
            schema: RwLock::new(None),
            conn: RwLock::new(None),
            inited: RwLock::new(false),
            selected: RwLock::new(None),
        }
    }

    /// Creates a client over a fresh in-memory engine.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEngine::new()))
    }

    /// Supplies or replaces the schema descriptor. Chainable.
    pub fn configure(&self, schema: Schema) -> ClientResult<&Self> {
        schema.validate()?;
        *self.schema.write() = Some(schema);
        Ok(self)
    }

    /// Opens the database and creates missing storages and indexes.
    ///
    /// On a fresh database or a version increase the engine opens its
    /// upgrade window; every declared storage not yet present is created
    /// with an auto-increment primary key, along with its declared
    /// indexes. Storages already present are left untouched; adding an
    /// index to one requires a version bump. A second `init` on an
    /// initialized client is a no-op.
    pub fn init(&self) -> ClientResult<()> {
        if *self.inited.read() {
            return Ok(());
        }
        let schema = self
            .schema
            .read()
            .clone()
            .ok_or(ClientError::NotConfigured)?;

        let mut upgrade = |editor: &mut dyn SchemaEditor| -> EngineResult<()> {
            for storage in &schema.storages {
                if editor.has_store(storage) {
                    continue;
                }
                editor.create_store(storage)?;
                for decl in schema.indexes_for(storage) {
                    editor.create_index(storage, &decl.name, &decl.field, decl.unique)?;
                }
                tracing::debug!(storage = %storage, "created storage during upgrade");
            }
            Ok(())
        };
        let conn =
            request::finish(self.engine.open(&schema.name, schema.version, &mut upgrade))?;

        tracing::info!(db = %schema.name, version = conn.version(), "database opened");
        *self.conn.write() = Some(conn);
        *self.inited.write() = true;
        Ok(())
    }

    /// Whether `init` has completed.
    #[must_use]
    pub fn is_inited(&self) -> bool {
        *self.inited.read()
    }

    /// Creates a storage outside the upgrade window.
    pub fn create_storage(&self, name: &str) -> ClientResult<()> {
        let conn = self.connection()?;
        request::finish(conn.create_store(name))?;
        tracing::debug!(storage = name, "created storage");
        Ok(())
    }

    /// Deletes a storage. Deleting a missing storage succeeds.
    pub fn delete_storage(&self, name: &str) -> ClientResult<()> {
        let conn = self.connection()?;
        request::finish(conn.delete_store(name))
    }

    /// Deletes the whole database and resets the initialized flag.
    ///
    /// The client's own connection is closed first. If the engine
    /// reports the deletion blocked by another open connection, the
    /// error is surfaced, the initialized flag stays unchanged and the
    /// client's connection is restored.
    pub fn delete_db(&self) -> ClientResult<()> {
        let name = self
            .schema
            .read()
            .as_ref()
            .map(|s| s.name.clone())
            .ok_or(ClientError::NotConfigured)?;

        let previous = self.conn.write().take();
        if let Some(conn) = &previous {
            conn.close();
        }

        match request::finish(self.engine.delete_database(&name)) {
            Ok(()) => {
                *self.inited.write() = false;
                tracing::info!(db = %name, "database deleted");
                Ok(())
            }
            Err(error) => {
                if previous.is_some() {
                    let mut reopen =
                        |_: &mut dyn SchemaEditor| -> EngineResult<()> { Ok(()) };
                    match self.engine.open(&name, None, &mut reopen) {
                        Ok(conn) => *self.conn.write() = Some(conn),
                        Err(reopen_error) => {
                            tracing::warn!(db = %name, error = %reopen_error,
                                "could not restore connection after blocked deletion");
                        }
                    }
                }
                Err(error)
            }
        }
    }

    /// Targets a storage for the next operation. Chainable.
    ///
    /// Sets the selection context and returns a handle carrying the
    /// target by value; either route works:
    ///
    /// ```rust,ignore
    /// stash.from("tasks").select(Selection::all())?;   // scoped handle
    /// stash.from("tasks");
    /// stash.select(Selection::all())?;                 // ambient context
    /// ```
    pub fn from(&self, storage: &str) -> Selected<'_> {
        *self.selected.write() = Some(storage.to_string());
        Selected {
            client: self,
            storage: storage.to_string(),
        }
    }

    /// Retrieves records per the selection from the targeted storage.
    pub fn select<T: DeserializeOwned>(&self, selection: Selection) -> ClientResult<Vec<T>> {
        let _guard = ContextGuard::new(&self.selected);
        let target = self.current_target()?;
        self.select_in(&target, &selection)
    }

    /// Writes a new record to the targeted storage and returns its key.
    pub fn insert<T: Serialize>(&self, record: &T) -> ClientResult<RecordId> {
        let _guard = ContextGuard::new(&self.selected);
        let target = self.current_target()?;
        self.insert_in(&target, record)
    }

    /// Replaces the record at the key it carries, in the targeted storage.
    pub fn update<T: Serialize>(&self, record: &T) -> ClientResult<()> {
        let _guard = ContextGuard::new(&self.selected);
        let target = self.current_target()?;
        self.update_in(&target, record)
    }

    /// Deletes records per the selection from the targeted storage.
    pub fn delete(&self, selection: Selection) -> ClientResult<()> {
        let _guard = ContextGuard::new(&self.selected);
        let target = self.current_target()?;
        self.delete_in(&target, &selection)
    }

    fn current_target(&self) -> ClientResult<String> {
        self.selected
            .read()
            .clone()
            .ok_or(ClientError::NoStorageSelected)
    }

    fn connection(&self) -> ClientResult<Arc<dyn Connection>> {
        self.conn.read().clone().ok_or(ClientError::NotInitialized)
    }

    fn with_schema<R>(&self, f: impl FnOnce(&Schema) -> ClientResult<R>) -> ClientResult<R> {
        let guard = self.schema.read();
        let schema = guard.as_ref().ok_or(ClientError::NotConfigured)?;
        f(schema)
    }

    fn select_in<T: DeserializeOwned>(
        &self,
        storage: &str,
        selection: &Selection,
    ) -> ClientResult<Vec<T>> {
        let conn = self.connection()?;
        let docs = self.with_schema(|schema| {
            query::execute(conn.as_ref(), schema, storage, selection)
        })?;
        docs.into_iter().map(decode).collect()
    }

    fn insert_in<T: Serialize>(&self, storage: &str, record: &T) -> ClientResult<RecordId> {
        let doc = encode(record)?;
        let conn = self.connection()?;
        mutate::insert(conn.as_ref(), storage, doc)
    }

    fn update_in<T: Serialize>(&self, storage: &str, record: &T) -> ClientResult<()> {
        let doc = encode(record)?;
        let conn = self.connection()?;
        mutate::update(conn.as_ref(), storage, doc)
    }

    fn delete_in(&self, storage: &str, selection: &Selection) -> ClientResult<()> {
        let conn = self.connection()?;
        self.with_schema(|schema| mutate::delete(conn.as_ref(), schema, storage, selection))
    }
}

impl std::fmt::Debug for Stash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stash")
            .field("is_inited", &self.is_inited())
            .field("selected", &*self.selected.read())
            .finish_non_exhaustive()
    }
}

/// A storage target returned by [`Stash::from`].
///
/// Carries the target by value, so operations through it cannot be
/// redirected by a later `from` on the same client.
pub struct Selected<'a> {
    client: &'a Stash,
    storage: String,
}

impl Selected<'_> {
    /// The targeted storage name.
    #[must_use]
    pub fn storage(&self) -> &str {
        &self.storage
    }

    /// Retrieves records per the selection.
    pub fn select<T: DeserializeOwned>(&self, selection: Selection) -> ClientResult<Vec<T>> {
        let _guard = ContextGuard::new(&self.client.selected);
        self.client.select_in(&self.storage, &selection)
    }

    /// Writes a new record and returns its engine-assigned key.
    pub fn insert<T: Serialize>(&self, record: &T) -> ClientResult<RecordId> {
        let _guard = ContextGuard::new(&self.client.selected);
        self.client.insert_in(&self.storage, record)
    }

    /// Replaces the record at the key it carries.
    pub fn update<T: Serialize>(&self, record: &T) -> ClientResult<()> {
        let _guard = ContextGuard::new(&self.client.selected);
        self.client.update_in(&self.storage, record)
    }

    /// Deletes records per the selection.
    pub fn delete(&self, selection: Selection) -> ClientResult<()> {
        let _guard = ContextGuard::new(&self.client.selected);
        self.client.delete_in(&self.storage, &selection)
    }
}

fn encode<T: Serialize>(record: &T) -> ClientResult<Document> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ClientError::invalid_record(format!(
            "record must serialize to an object, got {other}"
        ))),
        Err(error) => Err(ClientError::invalid_record(error.to_string())),
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> ClientResult<T> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|error| ClientError::invalid_record(error.to_string()))
}
