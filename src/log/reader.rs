use std::sync::Arc;
use std::time::Duration;

use super::entry::{EntryId, LogEntry};
use super::session_log::{LogError, SessionLog};

/// A private cursor over one [`SessionLog`].
///
/// Polling never moves the cursor; callers advance it explicitly once an
/// entry has been handled. Until then repeated polls return the same
/// entries, which is what gives consumers their at-least-once behavior.
pub struct LogReader {
    log: Arc<SessionLog>,
    position: EntryId,
}

impl LogReader {
    /// Cursor positioned before the first entry, replaying the whole log.
    pub fn new(log: Arc<SessionLog>) -> Self {
        Self::from_position(log, EntryId::ZERO)
    }

    pub fn from_position(log: Arc<SessionLog>, position: EntryId) -> Self {
        Self { log, position }
    }

    /// Reads up to `max_count` entries past the cursor, blocking up to
    /// `max_wait` for the first one. Empty on timeout.
    pub async fn poll(
        &self,
        max_count: usize,
        max_wait: Duration,
    ) -> Result<Vec<LogEntry>, LogError> {
        self.log.read_after(self.position, max_count, max_wait).await
    }

    /// Moves the cursor to `id`. Ignores ids at or behind the current
    /// position so a stale acknowledgement can never rewind the cursor.
    pub fn advance_to(&mut self, id: EntryId) {
        if id > self.position {
            self.position = id;
        }
    }

    pub fn position(&self) -> EntryId {
        self.position
    }

    pub fn log_name(&self) -> &str {
        self.log.name()
    }
}
