//! SCGDI Store - Durable history persistence
//!
//! Append-only SQLite storage for variable samples (`var_history`) and
//! alarm/status events (`event_history`). No updates or deletes: every
//! write is one self-contained insert on its own pooled connection, so
//! a crash between two writes loses at most one record and never leaves
//! a half-written row.

mod error;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use schema::{EVENT_HISTORY_TABLE, VAR_HISTORY_TABLE};
pub use store::{EventRecord, HistoryStore, VarRecord};
