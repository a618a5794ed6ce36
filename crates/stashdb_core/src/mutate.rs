//! Mutation and deletion engines.
//!
//! Inserts let the engine assign the primary key; updates replace the
//! record at its carried key entirely. Deletion removes a single record
//! by primary key directly, or every record matching an index value by
//! walking a cursor and deleting at each position, since the engine has
//! no delete-all-matching primitive for non-unique indexes.

use crate::error::{ClientError, ClientResult};
use crate::query;
use crate::request;
use crate::schema::Schema;
use crate::selection::{KeySpace, Selection, ValueSelector};
use stashdb_engine::{record_id, AccessMode, Connection, CursorSource, Direction, Document, RecordId};

/// Writes a new record and returns the engine-assigned key.
pub(crate) fn insert(
    conn: &dyn Connection,
    storage: &str,
    doc: Document,
) -> ClientResult<RecordId> {
    let txn = request::finish(conn.transaction(storage, AccessMode::ReadWrite))?;
    request::finish(txn.insert(doc))
}

/// Replaces the record at the key the document carries.
pub(crate) fn update(conn: &dyn Connection, storage: &str, doc: Document) -> ClientResult<()> {
    let id = record_id(&doc).ok_or(ClientError::MissingKey)?;
    let txn = request::finish(conn.transaction(storage, AccessMode::ReadWrite))?;
    request::finish(txn.put(id, doc))
}

/// Deletes by primary key or by indexed value, per the descriptor.
pub(crate) fn delete(
    conn: &dyn Connection,
    schema: &Schema,
    storage: &str,
    selection: &Selection,
) -> ClientResult<()> {
    let value = selection
        .value
        .as_ref()
        .ok_or_else(|| ClientError::invalid_descriptor("delete requires a value"))?;

    match &selection.key {
        KeySpace::Primary => {
            let ValueSelector::Exact(scalar) = value else {
                return Err(ClientError::invalid_descriptor(
                    "primary-key delete requires an exact key, not a range",
                ));
            };
            let id = query::exact_id(scalar)?;
            let txn = request::finish(conn.transaction(storage, AccessMode::ReadWrite))?;
            request::finish(txn.delete(id))
        }
        KeySpace::Index(name) => {
            if !schema.has_index(storage, name) {
                return Err(ClientError::unknown_index(storage, name));
            }
            let range = query::key_range(Some(value));
            tracing::debug!(storage, index = %name, "index-scoped delete");

            let txn = request::finish(conn.transaction(storage, AccessMode::ReadWrite))?;
            let mut cursor = request::finish(txn.open_cursor(
                CursorSource::Index {
                    name: name.clone(),
                    range,
                },
                Direction::Forward,
            ))?;
            while request::finish(cursor.advance())?.is_some() {
                request::finish(cursor.delete_current())?;
            }
            Ok(())
        }
    }
}
