//! In-memory reference engine.
//!
//! Implements the full engine contract against process memory: versioned
//! databases, storages with auto-increment keys, secondary indexes,
//! cursors and blocked deletion. Suitable for unit tests, integration
//! tests and ephemeral databases.
//!
//! Transactions here are serialization points, not rollback scopes: each
//! handle's operations apply immediately under the storage lock.

use crate::error::{EngineError, EngineResult};
use crate::key::{IdRange, KeyRange, Scalar};
use crate::record::{set_record_id, Document, RecordId};
use crate::traits::{
    AccessMode, Connection, Cursor, CursorSource, Direction, SchemaEditor, StorageEngine,
    StoreHandle, UpgradeHook,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// An in-memory storage engine.
///
/// Databases live for as long as the engine value does, so several
/// connections (and clients) can share one engine and observe each
/// other's data.
///
/// # Example
///
/// ```rust
/// use stashdb_engine::{Connection, MemoryEngine, SchemaEditor, StorageEngine};
///
/// let engine = MemoryEngine::new();
/// let conn = engine
///     .open("app", None, &mut |editor| editor.create_store("tasks"))
///     .unwrap();
/// assert_eq!(conn.store_names(), vec!["tasks".to_string()]);
/// ```
#[derive(Default)]
pub struct MemoryEngine {
    databases: RwLock<HashMap<String, Arc<DatabaseState>>>,
}

impl MemoryEngine {
    /// Creates an engine with no databases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

struct DatabaseState {
    name: String,
    version: RwLock<u32>,
    stores: RwLock<BTreeMap<String, Arc<RwLock<StoreState>>>>,
    connections: AtomicUsize,
}

impl DatabaseState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: RwLock::new(0),
            stores: RwLock::new(BTreeMap::new()),
            connections: AtomicUsize::new(0),
        }
    }
}

struct StoreState {
    name: String,
    /// Next key to assign; monotonic, never rewound on deletion.
    next_id: u64,
    records: BTreeMap<u64, Document>,
    indexes: BTreeMap<String, IndexState>,
}

struct IndexState {
    field: String,
    unique: bool,
    /// Indexed key to primary keys; the inner set keeps ties in
    /// primary-key order.
    entries: BTreeMap<Scalar, BTreeSet<u64>>,
}

fn index_key(doc: &Document, field: &str) -> Option<Scalar> {
    doc.get(field).and_then(Scalar::from_json)
}

impl StoreState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_id: 1,
            records: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    fn create_index(&mut self, index: &str, field: &str, unique: bool) -> EngineResult<()> {
        if self.indexes.contains_key(index) {
            return Err(EngineError::IndexExists {
                store: self.name.clone(),
                index: index.to_string(),
            });
        }

        let mut state = IndexState {
            field: field.to_string(),
            unique,
            entries: BTreeMap::new(),
        };

        // Backfill from records already present.
        for (&id, doc) in &self.records {
            if let Some(key) = index_key(doc, field) {
                let ids = state.entries.entry(key.clone()).or_default();
                if unique && !ids.is_empty() {
                    return Err(EngineError::unique_violation(index, &key));
                }
                ids.insert(id);
            }
        }

        self.indexes.insert(index.to_string(), state);
        Ok(())
    }

    fn write_record(&mut self, id: u64, mut doc: Document) -> EngineResult<()> {
        set_record_id(&mut doc, RecordId::new(id));

        // Unique checks before any mutation, so a rejected write leaves
        // the store untouched.
        for (name, idx) in &self.indexes {
            if !idx.unique {
                continue;
            }
            if let Some(key) = index_key(&doc, &idx.field) {
                if let Some(ids) = idx.entries.get(&key) {
                    if ids.iter().any(|&other| other != id) {
                        return Err(EngineError::unique_violation(name, &key));
                    }
                }
            }
        }

        if let Some(old) = self.records.get(&id).cloned() {
            self.unindex(&old, id);
        }
        for idx in self.indexes.values_mut() {
            if let Some(key) = index_key(&doc, &idx.field) {
                idx.entries.entry(key).or_default().insert(id);
            }
        }
        self.records.insert(id, doc);
        Ok(())
    }

    fn remove_record(&mut self, id: u64) {
        if let Some(old) = self.records.remove(&id) {
            self.unindex(&old, id);
        }
    }

    fn unindex(&mut self, old: &Document, id: u64) {
        for idx in self.indexes.values_mut() {
            if let Some(key) = index_key(old, &idx.field) {
                if let Some(ids) = idx.entries.get_mut(&key) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        idx.entries.remove(&key);
                    }
                }
            }
        }
    }

    /// Primary keys matching an index range, in (key, primary-key) order.
    fn index_ids(&self, index: &str, range: &KeyRange) -> EngineResult<Vec<u64>> {
        let idx = self
            .indexes
            .get(index)
            .ok_or_else(|| EngineError::unknown_index(&self.name, index))?;
        if !range.is_satisfiable() {
            return Ok(Vec::new());
        }
        let bounds = (range.lower.clone(), range.upper.clone());
        Ok(idx
            .entries
            .range(bounds)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect())
    }

    /// Primary keys matching a primary range, ascending.
    fn primary_ids(&self, range: &IdRange) -> Vec<u64> {
        if !range.is_satisfiable() {
            return Vec::new();
        }
        let bounds = (
            range.lower.map(|r| r.as_u64()),
            range.upper.map(|r| r.as_u64()),
        );
        self.records.range(bounds).map(|(&id, _)| id).collect()
    }
}

struct MemoryEditor<'a> {
    db: &'a DatabaseState,
    old_version: u32,
    new_version: u32,
}

impl SchemaEditor for MemoryEditor<'_> {
    fn old_version(&self) -> u32 {
        self.old_version
    }

    fn new_version(&self) -> u32 {
        self.new_version
    }

    fn has_store(&self, name: &str) -> bool {
        self.db.stores.read().contains_key(name)
    }

    fn create_store(&mut self, name: &str) -> EngineResult<()> {
        create_store(self.db, name)
    }

    fn create_index(
        &mut self,
        store: &str,
        index: &str,
        field: &str,
        unique: bool,
    ) -> EngineResult<()> {
        let stores = self.db.stores.read();
        let state = stores
            .get(store)
            .ok_or_else(|| EngineError::unknown_store(store))?;
        let result = state.write().create_index(index, field, unique);
        result
    }
}

fn create_store(db: &DatabaseState, name: &str) -> EngineResult<()> {
    let mut stores = db.stores.write();
    if stores.contains_key(name) {
        return Err(EngineError::store_exists(name));
    }
    stores.insert(name.to_string(), Arc::new(RwLock::new(StoreState::new(name))));
    Ok(())
}

impl StorageEngine for MemoryEngine {
    fn open(
        &self,
        name: &str,
        version: Option<u32>,
        on_upgrade: &mut UpgradeHook<'_>,
    ) -> EngineResult<Arc<dyn Connection>> {
        let db = {
            let mut databases = self.databases.write();
            Arc::clone(
                databases
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(DatabaseState::new(name))),
            )
        };

        let stored = *db.version.read();
        let requested = version.unwrap_or(stored.max(1));
        if requested < stored {
            return Err(EngineError::VersionRegression { stored, requested });
        }
        if requested > stored {
            let mut editor = MemoryEditor {
                db: &db,
                old_version: stored,
                new_version: requested,
            };
            on_upgrade(&mut editor)?;
            *db.version.write() = requested;
        }

        db.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryConnection {
            db,
            open: AtomicBool::new(true),
        }))
    }

    fn delete_database(&self, name: &str) -> EngineResult<()> {
        let mut databases = self.databases.write();
        let blocked = databases
            .get(name)
            .is_some_and(|db| db.connections.load(Ordering::SeqCst) > 0);
        if blocked {
            return Err(EngineError::blocked(name));
        }
        databases.remove(name);
        Ok(())
    }
}

struct MemoryConnection {
    db: Arc<DatabaseState>,
    open: AtomicBool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> EngineResult<()> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::Closed)
        }
    }
}

impl Connection for MemoryConnection {
    fn database_name(&self) -> &str {
        &self.db.name
    }

    fn version(&self) -> u32 {
        *self.db.version.read()
    }

    fn store_names(&self) -> Vec<String> {
        self.db.stores.read().keys().cloned().collect()
    }

    fn create_store(&self, name: &str) -> EngineResult<()> {
        self.ensure_open()?;
        create_store(&self.db, name)
    }

    fn delete_store(&self, name: &str) -> EngineResult<()> {
        self.ensure_open()?;
        self.db.stores.write().remove(name);
        Ok(())
    }

    fn transaction(&self, store: &str, mode: AccessMode) -> EngineResult<Box<dyn StoreHandle>> {
        self.ensure_open()?;
        let stores = self.db.stores.read();
        let state = stores
            .get(store)
            .ok_or_else(|| EngineError::unknown_store(store))?;
        Ok(Box::new(MemoryStoreHandle {
            store: Arc::clone(state),
            mode,
        }))
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.db.connections.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.close();
    }
}

struct MemoryStoreHandle {
    store: Arc<RwLock<StoreState>>,
    mode: AccessMode,
}

impl MemoryStoreHandle {
    fn ensure_writable(&self, operation: &'static str) -> EngineResult<()> {
        match self.mode {
            AccessMode::ReadWrite => Ok(()),
            AccessMode::ReadOnly => Err(EngineError::ReadOnly { operation }),
        }
    }
}

impl StoreHandle for MemoryStoreHandle {
    fn get(&self, id: RecordId) -> EngineResult<Option<Document>> {
        Ok(self.store.read().records.get(&id.as_u64()).cloned())
    }

    fn get_range(&self, range: &IdRange, count: Option<usize>) -> EngineResult<Vec<Document>> {
        let state = self.store.read();
        let ids = state.primary_ids(range);
        let cap = count.unwrap_or(ids.len());
        Ok(ids
            .into_iter()
            .take(cap)
            .filter_map(|id| state.records.get(&id).cloned())
            .collect())
    }

    fn index_range(
        &self,
        index: &str,
        range: &KeyRange,
        count: Option<usize>,
    ) -> EngineResult<Vec<Document>> {
        let state = self.store.read();
        let ids = state.index_ids(index, range)?;
        let cap = count.unwrap_or(ids.len());
        Ok(ids
            .into_iter()
            .take(cap)
            .filter_map(|id| state.records.get(&id).cloned())
            .collect())
    }

    fn insert(&self, mut doc: Document) -> EngineResult<RecordId> {
        self.ensure_writable("insert")?;
        // The engine owns key assignment; a stale caller-supplied key is
        // discarded before the write.
        doc.remove(crate::record::KEY_FIELD);
        let mut state = self.store.write();
        let id = state.next_id;
        state.write_record(id, doc)?;
        state.next_id = id + 1;
        Ok(RecordId::new(id))
    }

    fn put(&self, id: RecordId, doc: Document) -> EngineResult<()> {
        self.ensure_writable("put")?;
        let mut state = self.store.write();
        state.write_record(id.as_u64(), doc)?;
        if id.as_u64() >= state.next_id {
            state.next_id = id.as_u64() + 1;
        }
        Ok(())
    }

    fn delete(&self, id: RecordId) -> EngineResult<()> {
        self.ensure_writable("delete")?;
        self.store.write().remove_record(id.as_u64());
        Ok(())
    }

    fn open_cursor(
        &self,
        source: CursorSource,
        direction: Direction,
    ) -> EngineResult<Box<dyn Cursor>> {
        let state = self.store.read();
        let mut ids = match &source {
            CursorSource::Primary(range) => state.primary_ids(range),
            CursorSource::Index { name, range } => state.index_ids(name, range)?,
        };
        if direction == Direction::Reverse {
            ids.reverse();
        }
        Ok(Box::new(MemoryCursor {
            store: Arc::clone(&self.store),
            mode: self.mode,
            ids,
            pos: 0,
            current: None,
        }))
    }
}

/// Cursor over a snapshot of matching keys.
///
/// The position list is fixed at open; records deleted afterwards are
/// skipped on advance, so delete-then-advance loops terminate.
struct MemoryCursor {
    store: Arc<RwLock<StoreState>>,
    mode: AccessMode,
    ids: Vec<u64>,
    pos: usize,
    current: Option<u64>,
}

impl Cursor for MemoryCursor {
    fn advance(&mut self) -> EngineResult<Option<Document>> {
        while self.pos < self.ids.len() {
            let id = self.ids[self.pos];
            self.pos += 1;
            let doc = self.store.read().records.get(&id).cloned();
            if let Some(doc) = doc {
                self.current = Some(id);
                return Ok(Some(doc));
            }
        }
        self.current = None;
        Ok(None)
    }

    fn delete_current(&mut self) -> EngineResult<()> {
        if self.mode == AccessMode::ReadOnly {
            return Err(EngineError::ReadOnly {
                operation: "cursor delete",
            });
        }
        let id = self.current.ok_or(EngineError::InvalidCursor)?;
        self.store.write().remove_record(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn open_with_tasks(engine: &MemoryEngine) -> Arc<dyn Connection> {
        engine
            .open("test", None, &mut |editor| {
                editor.create_store("tasks")?;
                editor.create_index("tasks", "tasksName", "name", false)
            })
            .unwrap()
    }

    #[test]
    fn fresh_open_runs_upgrade() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        assert_eq!(conn.version(), 1);
        assert_eq!(conn.store_names(), vec!["tasks".to_string()]);
    }

    #[test]
    fn reopen_at_same_version_skips_upgrade() {
        let engine = MemoryEngine::new();
        open_with_tasks(&engine).close();

        let conn = engine
            .open("test", Some(1), &mut |_| {
                panic!("upgrade must not run at the stored version")
            })
            .unwrap();
        assert_eq!(conn.version(), 1);
    }

    #[test]
    fn version_regression_fails() {
        let engine = MemoryEngine::new();
        engine
            .open("test", Some(3), &mut |e| e.create_store("tasks"))
            .unwrap()
            .close();

        let result = engine.open("test", Some(2), &mut |_| Ok(()));
        assert!(matches!(
            result,
            Err(EngineError::VersionRegression {
                stored: 3,
                requested: 2
            })
        ));
    }

    #[test]
    fn insert_assigns_sequential_keys() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        let a = txn.insert(doc(json!({"name": "A"}))).unwrap();
        let b = txn.insert(doc(json!({"name": "B"}))).unwrap();
        assert_eq!(a, RecordId::new(1));
        assert_eq!(b, RecordId::new(2));

        let stored = txn.get(a).unwrap().unwrap();
        assert_eq!(stored.get("id"), Some(&json!(1)));
        assert_eq!(stored.get("name"), Some(&json!("A")));
    }

    #[test]
    fn keys_are_never_reused_after_delete() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        let a = txn.insert(doc(json!({"name": "A"}))).unwrap();
        txn.delete(a).unwrap();
        let b = txn.insert(doc(json!({"name": "B"}))).unwrap();
        assert_eq!(b, RecordId::new(2));
    }

    #[test]
    fn insert_discards_caller_supplied_key() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        let id = txn.insert(doc(json!({"id": 99, "name": "A"}))).unwrap();
        assert_eq!(id, RecordId::new(1));
    }

    #[test]
    fn put_replaces_and_reindexes() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        let id = txn.insert(doc(json!({"name": "A", "done": false}))).unwrap();
        txn.put(id, doc(json!({"name": "B"}))).unwrap();

        // full replace, no merge
        let stored = txn.get(id).unwrap().unwrap();
        assert_eq!(stored.get("done"), None);

        // index follows the new field value
        let hits = txn
            .index_range("tasksName", &KeyRange::only(Scalar::from("A")), None)
            .unwrap();
        assert!(hits.is_empty());
        let hits = txn
            .index_range("tasksName", &KeyRange::only(Scalar::from("B")), None)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn put_beyond_counter_advances_it() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        txn.put(RecordId::new(10), doc(json!({"name": "X"}))).unwrap();
        let next = txn.insert(doc(json!({"name": "Y"}))).unwrap();
        assert_eq!(next, RecordId::new(11));
    }

    #[test]
    fn index_range_orders_by_key_then_primary() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        txn.insert(doc(json!({"name": "B"}))).unwrap(); // id 1
        txn.insert(doc(json!({"name": "A"}))).unwrap(); // id 2
        txn.insert(doc(json!({"name": "A"}))).unwrap(); // id 3

        let all = txn.index_range("tasksName", &KeyRange::all(), None).unwrap();
        let ids: Vec<u64> = all.iter().map(|d| d["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn unique_index_rejects_second_key() {
        let engine = MemoryEngine::new();
        let conn = engine
            .open("test", None, &mut |editor| {
                editor.create_store("users")?;
                editor.create_index("users", "usersEmail", "email", true)
            })
            .unwrap();
        let txn = conn.transaction("users", AccessMode::ReadWrite).unwrap();

        txn.insert(doc(json!({"email": "a@x"}))).unwrap();
        let result = txn.insert(doc(json!({"email": "a@x"})));
        assert!(matches!(result, Err(EngineError::UniqueViolation { .. })));

        // the failed write left nothing behind
        assert_eq!(txn.get_range(&IdRange::all(), None).unwrap().len(), 1);
    }

    #[test]
    fn unindexed_field_records_are_skipped() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        txn.insert(doc(json!({"name": "A"}))).unwrap();
        txn.insert(doc(json!({"title": "no name field"}))).unwrap();

        let all = txn.index_range("tasksName", &KeyRange::all(), None).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn get_range_caps_at_count() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        for i in 0..5 {
            txn.insert(doc(json!({"n": i}))).unwrap();
        }
        let some = txn.get_range(&IdRange::all(), Some(3)).unwrap();
        assert_eq!(some.len(), 3);
        assert_eq!(some[0]["id"], json!(1));
    }

    #[test]
    fn reverse_cursor_walks_descending() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        for i in 0..4 {
            txn.insert(doc(json!({"n": i}))).unwrap();
        }
        let mut cursor = txn
            .open_cursor(CursorSource::Primary(IdRange::all()), Direction::Reverse)
            .unwrap();
        let mut seen = Vec::new();
        while let Some(record) = cursor.advance().unwrap() {
            seen.push(record["id"].as_u64().unwrap());
        }
        assert_eq!(seen, vec![4, 3, 2, 1]);
    }

    #[test]
    fn cursor_delete_then_advance_clears_matches() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        txn.insert(doc(json!({"name": "A"}))).unwrap();
        txn.insert(doc(json!({"name": "B"}))).unwrap();
        txn.insert(doc(json!({"name": "A"}))).unwrap();

        let mut cursor = txn
            .open_cursor(
                CursorSource::Index {
                    name: "tasksName".into(),
                    range: KeyRange::only(Scalar::from("A")),
                },
                Direction::Forward,
            )
            .unwrap();
        while cursor.advance().unwrap().is_some() {
            cursor.delete_current().unwrap();
        }

        let left = txn.get_range(&IdRange::all(), None).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0]["name"], json!("B"));
    }

    #[test]
    fn cursor_delete_before_advance_fails() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();

        let mut cursor = txn
            .open_cursor(CursorSource::Primary(IdRange::all()), Direction::Forward)
            .unwrap();
        assert!(matches!(
            cursor.delete_current(),
            Err(EngineError::InvalidCursor)
        ));
    }

    #[test]
    fn read_only_transaction_rejects_writes() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        let txn = conn.transaction("tasks", AccessMode::ReadOnly).unwrap();

        assert!(matches!(
            txn.insert(doc(json!({"name": "A"}))),
            Err(EngineError::ReadOnly { .. })
        ));
        assert!(matches!(
            txn.delete(RecordId::new(1)),
            Err(EngineError::ReadOnly { .. })
        ));
    }

    #[test]
    fn delete_blocked_while_connection_open() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);

        let result = engine.delete_database("test");
        assert!(matches!(result, Err(EngineError::Blocked { .. })));

        conn.close();
        engine.delete_database("test").unwrap();
        assert!(engine.delete_database("test").is_ok()); // missing db is fine
    }

    #[test]
    fn closed_connection_rejects_transactions() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);
        conn.close();

        let result = conn.transaction("tasks", AccessMode::ReadOnly);
        assert!(matches!(result, Err(EngineError::Closed)));
    }

    #[test]
    fn post_open_store_management() {
        let engine = MemoryEngine::new();
        let conn = open_with_tasks(&engine);

        conn.create_store("notes").unwrap();
        assert!(matches!(
            conn.create_store("notes"),
            Err(EngineError::StoreExists { .. })
        ));

        conn.delete_store("notes").unwrap();
        conn.delete_store("notes").unwrap(); // idempotent

        assert!(matches!(
            conn.transaction("notes", AccessMode::ReadOnly),
            Err(EngineError::UnknownStore { .. })
        ));
    }

    #[test]
    fn index_backfills_existing_records() {
        let engine = MemoryEngine::new();
        let conn = engine
            .open("test", None, &mut |e| e.create_store("tasks"))
            .unwrap();
        let txn = conn.transaction("tasks", AccessMode::ReadWrite).unwrap();
        txn.insert(doc(json!({"name": "A"}))).unwrap();
        conn.close();

        // version bump adds the index over pre-existing data
        let conn = engine
            .open("test", Some(2), &mut |e| {
                e.create_index("tasks", "tasksName", "name", false)
            })
            .unwrap();
        let txn = conn.transaction("tasks", AccessMode::ReadOnly).unwrap();
        let hits = txn
            .index_range("tasksName", &KeyRange::only(Scalar::from("A")), None)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
