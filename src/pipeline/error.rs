use thiserror::Error;

use crate::log::{EntryId, LogError};

/// Failure modes of the pipeline stages.
///
/// The split drives recovery: malformed entries are skipped in place,
/// transient errors restart the stage without moving its cursor, and a
/// lost connection only ever ends the one attachment it belongs to.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An entry lacks a field the stage requires, or carries one it cannot
    /// decode. Skipped exactly once, never retried.
    #[error("malformed entry {id} in {stage} input: bad field '{field}'")]
    MalformedEntry {
        stage: &'static str,
        id: EntryId,
        field: &'static str,
    },

    /// A call to an external collaborator failed. The stage restarts after
    /// a backoff and re-reads from its unadvanced cursor.
    #[error("collaborator failure in {stage}: {source}")]
    Collaborator {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The backing log went away, usually session teardown racing a
    /// blocked read.
    #[error("log unavailable: {0}")]
    LogUnavailable(String),

    /// The peer on an audio source or viewer connection is gone. Terminal
    /// for that connection, invisible to everything else.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

impl PipelineError {
    /// True for errors a supervised stage recovers from by restarting.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::Collaborator { .. } | PipelineError::LogUnavailable(_)
        )
    }
}

impl From<LogError> for PipelineError {
    fn from(err: LogError) -> Self {
        PipelineError::LogUnavailable(err.to_string())
    }
}
