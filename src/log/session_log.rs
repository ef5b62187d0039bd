use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Notify, RwLock};
use tokio::time::Instant;
use tracing::debug;

use super::entry::{EntryId, FieldMap, LogEntry};

/// Errors surfaced by log operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log was closed by session teardown. Appends and reads against a
    /// closed log fail immediately instead of blocking.
    #[error("log '{0}' is closed")]
    Closed(String),
}

/// An append-only, ordered log of entries for one session topic.
///
/// Appends assign strictly increasing [`EntryId`]s and become visible to
/// readers atomically. `read_after` blocks until entries past a cursor
/// exist, a wait budget elapses (empty result, not an error), or the log
/// is closed.
///
/// Entries are kept for the whole session lifetime; nothing is trimmed
/// until the session ends and the log is dropped, so late readers can
/// always replay from [`EntryId::ZERO`].
pub struct SessionLog {
    name: String,
    inner: RwLock<LogInner>,
    readable: Notify,
}

struct LogInner {
    entries: Vec<LogEntry>,
    last_id: EntryId,
    closed: bool,
}

impl SessionLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: RwLock::new(LogInner {
                entries: Vec::new(),
                last_id: EntryId::ZERO,
                closed: false,
            }),
            readable: Notify::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an entry and returns its assigned id.
    ///
    /// The id is strictly greater than every id this log has returned
    /// before, and the entry is visible to every subsequent read once this
    /// call returns.
    pub async fn append(&self, fields: FieldMap) -> Result<EntryId, LogError> {
        let id = {
            let mut inner = self.inner.write().await;
            if inner.closed {
                return Err(LogError::Closed(self.name.clone()));
            }
            let now_millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
            let id = inner.last_id.successor(now_millis);
            inner.last_id = id;
            inner.entries.push(LogEntry { id, fields });
            id
        };
        self.readable.notify_waiters();
        Ok(id)
    }

    /// Reads up to `max_count` entries with ids strictly greater than
    /// `after`, blocking up to `max_wait` for the first one to arrive.
    ///
    /// Returns an empty batch when the wait budget elapses with nothing to
    /// read. The only error is the log being closed underneath the caller.
    pub async fn read_after(
        &self,
        after: EntryId,
        max_count: usize,
        max_wait: Duration,
    ) -> Result<Vec<LogEntry>, LogError> {
        let deadline = Instant::now() + max_wait;
        loop {
            // Register for wakeups before inspecting state, otherwise an
            // append between the check and the wait would be missed.
            let readable = self.readable.notified();
            tokio::pin!(readable);
            readable.as_mut().enable();

            {
                let inner = self.inner.read().await;
                if inner.closed {
                    return Err(LogError::Closed(self.name.clone()));
                }
                let start = inner.entries.partition_point(|entry| entry.id <= after);
                if start < inner.entries.len() {
                    let end = inner.entries.len().min(start + max_count);
                    return Ok(inner.entries[start..end].to_vec());
                }
            }

            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Ok(Vec::new());
            };
            if tokio::time::timeout(remaining, readable).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    /// Number of entries appended so far.
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Id of the most recent entry, or [`EntryId::ZERO`] for an empty log.
    pub async fn last_id(&self) -> EntryId {
        self.inner.read().await.last_id
    }

    /// Marks the log closed and wakes every blocked reader. Idempotent.
    pub(crate) async fn close(&self) {
        {
            let mut inner = self.inner.write().await;
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        debug!("Closed log '{}'", self.name);
        self.readable.notify_waiters();
    }
}
