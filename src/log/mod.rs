//! Per-session append-only event logs
//!
//! This module provides the ordered logs the pipeline stages communicate
//! through:
//! - `SessionLog` - append-only log with blocking reads past a cursor
//! - `LogReader` - explicit-advance cursor over one log
//! - `LogStore` - lazy per-session registry of the three topic logs
//! - `EntryId` - strictly increasing, opaque entry identifiers

mod entry;
mod reader;
mod session_log;
mod store;

pub use entry::{EntryId, FieldMap, LogEntry};
pub use reader::LogReader;
pub use session_log::{LogError, SessionLog};
pub use store::{LogStore, SessionLogs, Topic};
