//! Record identifiers and document helpers.

use serde_json::Value;
use std::fmt;

/// Field under which the engine stores a record's primary key.
pub const KEY_FIELD: &str = "id";

/// A record body: a JSON object.
///
/// The engine injects the primary key into the [`KEY_FIELD`] entry when a
/// record is written, so documents read back always carry their key.
pub type Document = serde_json::Map<String, Value>;

/// Primary key of a record within one storage.
///
/// Keys are assigned by the engine from a per-storage auto-increment
/// counter and are never reused after deletion within the same storage
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Creates a record ID from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw key value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec:{}", self.0)
    }
}

/// Reads the primary key stored in a document, if present.
#[must_use]
pub fn record_id(doc: &Document) -> Option<RecordId> {
    doc.get(KEY_FIELD)
        .and_then(Value::as_u64)
        .map(RecordId::new)
}

/// Writes the primary key into a document, replacing any prior value.
pub fn set_record_id(doc: &mut Document, id: RecordId) {
    doc.insert(KEY_FIELD.to_string(), Value::from(id.as_u64()));
}
