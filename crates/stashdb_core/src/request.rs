//! Request bridge.
//!
//! Every engine completion funnels through [`finish`], which turns the
//! engine's outcome into the client's single completion contract: a
//! `Result` carrying either the value or a classified error. Unique-index
//! violations become [`ClientError::Conflict`], blocked deletions become
//! [`ClientError::Blocked`], explicit store collisions become
//! [`ClientError::StorageExists`]; everything else passes through
//! unmodified. Nothing is retried.
//!
//! Post-completion side effects are drop guards: [`ContextGuard`] clears
//! the selection context when the operation's scope ends, success or
//! failure alike, so cleanup runs exactly once per logical operation.

use crate::error::{ClientError, ClientResult};
use parking_lot::RwLock;
use stashdb_engine::{EngineError, EngineResult};

/// Clears the selection context when dropped.
pub(crate) struct ContextGuard<'a> {
    slot: &'a RwLock<Option<String>>,
}

impl<'a> ContextGuard<'a> {
    pub(crate) fn new(slot: &'a RwLock<Option<String>>) -> Self {
        Self { slot }
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.slot.write().take();
    }
}

/// Normalizes one engine completion into the client contract.
pub(crate) fn finish<T>(outcome: EngineResult<T>) -> ClientResult<T> {
    outcome.map_err(classify)
}

fn classify(error: EngineError) -> ClientError {
    match error {
        EngineError::UniqueViolation { index, key } => ClientError::Conflict { index, key },
        EngineError::Blocked { name } => ClientError::Blocked { name },
        EngineError::StoreExists { name } => ClientError::StorageExists { name },
        other => ClientError::Engine(other),
    }
}
