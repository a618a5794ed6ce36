//! Query engine.
//!
//! Turns a [`Selection`] into one of four retrieval strategies and
//! executes it against the engine. Ascending traversal rides the
//! engine's natural bulk order; descending traversal and bounded
//! descending counts walk a reverse cursor.

use crate::error::{ClientError, ClientResult};
use crate::request;
use crate::schema::Schema;
use crate::selection::{KeySpace, Order, Selection, ValueSelector};
use stashdb_engine::{
    AccessMode, Connection, Cursor, CursorSource, Direction, Document, IdRange, KeyRange, RecordId,
    Scalar,
};
use std::ops::Bound;

/// Retrieval strategy, computed once per selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Bulk range read over the primary-key space, ascending.
    PrimaryBulk,
    /// Reverse cursor walk over the primary-key space.
    PrimaryCursor,
    /// Bulk range read over a named index, ascending.
    IndexBulk(String),
    /// Reverse cursor walk over a named index.
    IndexCursor(String),
}

impl Strategy {
    /// Picks the strategy for a selection.
    ///
    /// Ascending reads never need a cursor: the engine's bulk reads
    /// already return ascending key order, optionally capped. Descending
    /// reads walk a reverse cursor until `count` records are collected
    /// or the range is exhausted.
    #[must_use]
    pub fn plan(selection: &Selection) -> Self {
        match (&selection.key, selection.order) {
            (KeySpace::Primary, Order::Asc) => Self::PrimaryBulk,
            (KeySpace::Primary, Order::Desc) => Self::PrimaryCursor,
            (KeySpace::Index(name), Order::Asc) => Self::IndexBulk(name.clone()),
            (KeySpace::Index(name), Order::Desc) => Self::IndexCursor(name.clone()),
        }
    }
}

/// Executes a selection against the targeted storage.
pub(crate) fn execute(
    conn: &dyn Connection,
    schema: &Schema,
    storage: &str,
    selection: &Selection,
) -> ClientResult<Vec<Document>> {
    let strategy = Strategy::plan(selection);
    if let Strategy::IndexBulk(name) | Strategy::IndexCursor(name) = &strategy {
        if !schema.has_index(storage, name) {
            return Err(ClientError::unknown_index(storage, name));
        }
    }
    tracing::debug!(storage, strategy = ?strategy, "executing select");

    let txn = request::finish(conn.transaction(storage, AccessMode::ReadOnly))?;
    match strategy {
        Strategy::PrimaryBulk => {
            // Exact primary value is a single-key lookup, not a scan.
            if let Some(ValueSelector::Exact(scalar)) = &selection.value {
                let id = exact_id(scalar)?;
                let found = request::finish(txn.get(id))?;
                let mut out: Vec<Document> = found.into_iter().collect();
                if let Some(cap) = selection.count {
                    out.truncate(cap);
                }
                return Ok(out);
            }
            let range = id_range(selection.value.as_ref())?;
            request::finish(txn.get_range(&range, selection.count))
        }
        Strategy::PrimaryCursor => {
            let range = id_range(selection.value.as_ref())?;
            let mut cursor = request::finish(
                txn.open_cursor(CursorSource::Primary(range), Direction::Reverse),
            )?;
            walk(cursor.as_mut(), selection.count)
        }
        Strategy::IndexBulk(name) => {
            let range = key_range(selection.value.as_ref());
            request::finish(txn.index_range(&name, &range, selection.count))
        }
        Strategy::IndexCursor(name) => {
            let range = key_range(selection.value.as_ref());
            let mut cursor = request::finish(
                txn.open_cursor(CursorSource::Index { name, range }, Direction::Reverse),
            )?;
            walk(cursor.as_mut(), selection.count)
        }
    }
}

/// Accumulates cursor records until `count` or exhaustion.
///
/// Fewer than `count` results is a short result, not an error.
fn walk(cursor: &mut dyn Cursor, count: Option<usize>) -> ClientResult<Vec<Document>> {
    let mut out = Vec::new();
    if count == Some(0) {
        return Ok(out);
    }
    while let Some(doc) = request::finish(cursor.advance())? {
        out.push(doc);
        if count.is_some_and(|cap| out.len() >= cap) {
            break;
        }
    }
    Ok(out)
}

/// Interprets a selection value as a primary-key range.
pub(crate) fn id_range(value: Option<&ValueSelector>) -> ClientResult<IdRange> {
    match value {
        None => Ok(IdRange::all()),
        Some(ValueSelector::Exact(scalar)) => Ok(IdRange::only(exact_id(scalar)?)),
        Some(ValueSelector::Range { lower, upper }) => Ok(IdRange::new(
            id_bound(lower)?,
            id_bound(upper)?,
        )),
    }
}

fn id_bound(bound: &Bound<Scalar>) -> ClientResult<Bound<RecordId>> {
    match bound {
        Bound::Unbounded => Ok(Bound::Unbounded),
        Bound::Included(s) => Ok(Bound::Included(exact_id(s)?)),
        Bound::Excluded(s) => Ok(Bound::Excluded(exact_id(s)?)),
    }
}

pub(crate) fn exact_id(scalar: &Scalar) -> ClientResult<RecordId> {
    scalar.as_record_id().ok_or_else(|| {
        ClientError::invalid_descriptor(format!(
            "primary-key selection requires a non-negative integer, got {scalar}"
        ))
    })
}

/// Interprets a selection value as an index-key range.
pub(crate) fn key_range(value: Option<&ValueSelector>) -> KeyRange {
    match value {
        None => KeyRange::all(),
        Some(ValueSelector::Exact(scalar)) => KeyRange::only(scalar.clone()),
        Some(ValueSelector::Range { lower, upper }) => {
            KeyRange::new(lower.clone(), upper.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_ascending_is_bulk() {
        assert_eq!(Strategy::plan(&Selection::all()), Strategy::PrimaryBulk);
        // a count alone never forces a cursor
        assert_eq!(
            Strategy::plan(&Selection::all().count(3)),
            Strategy::PrimaryBulk
        );
    }

    #[test]
    fn primary_descending_walks_a_cursor() {
        assert_eq!(
            Strategy::plan(&Selection::all().desc()),
            Strategy::PrimaryCursor
        );
        assert_eq!(
            Strategy::plan(&Selection::all().count(3).desc()),
            Strategy::PrimaryCursor
        );
    }

    #[test]
    fn index_strategies_carry_the_name() {
        assert_eq!(
            Strategy::plan(&Selection::index("tasksName")),
            Strategy::IndexBulk("tasksName".into())
        );
        assert_eq!(
            Strategy::plan(&Selection::index("tasksName").desc()),
            Strategy::IndexCursor("tasksName".into())
        );
    }

    #[test]
    fn exact_value_on_primary_requires_integer() {
        assert!(exact_id(&Scalar::Int(3)).is_ok());
        assert!(matches!(
            exact_id(&Scalar::Text("x".into())),
            Err(ClientError::InvalidDescriptor { .. })
        ));
        assert!(exact_id(&Scalar::Int(-1)).is_err());
    }

    #[test]
    fn id_range_conversion() {
        let range = id_range(None).unwrap();
        assert!(matches!(range.lower, Bound::Unbounded));

        let sel = Selection::all().between(2i64, 5i64);
        let range = id_range(sel.value.as_ref()).unwrap();
        assert_eq!(range.lower, Bound::Included(RecordId::new(2)));
        assert_eq!(range.upper, Bound::Included(RecordId::new(5)));

        let sel = Selection::all().at_least("a");
        assert!(id_range(sel.value.as_ref()).is_err());
    }
}
