use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::log::{EntryId, FieldMap, SessionLog};

use super::error::PipelineError;
use super::FIELD_CHUNK;

/// Attachment for one audio source connection.
///
/// Chunks are appended to the session's audio log verbatim; decoding and
/// interpretation are downstream concerns. Multiple sources may push into
/// the same session and the log serializes them.
pub struct IngestStage {
    session_id: String,
    audio_log: Arc<SessionLog>,
}

impl IngestStage {
    pub(crate) fn new(session_id: impl Into<String>, audio_log: Arc<SessionLog>) -> Self {
        Self {
            session_id: session_id.into(),
            audio_log,
        }
    }

    /// Appends one chunk, returning its log id. Fails only when the
    /// session's logs were torn down underneath the connection.
    pub async fn push_chunk(&self, chunk: Bytes) -> Result<EntryId, PipelineError> {
        let size = chunk.len();
        let mut fields = FieldMap::new();
        fields.insert(FIELD_CHUNK.to_string(), chunk);
        let id = self.audio_log.append(fields).await?;
        debug!(
            "Ingested {} byte chunk as entry {} for session '{}'",
            size, id, self.session_id
        );
        Ok(id)
    }
}
