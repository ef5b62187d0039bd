use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use crate::log::{FieldMap, LogEntry};
use crate::summarizer::Summarizer;

use super::buffer::RollingBuffer;
use super::error::PipelineError;
use super::stage::{required_text_field, StageWorker};
use super::{FIELD_EXPANDED_TEXT, FIELD_NOTES_FOR_HEARING, FIELD_SIMPLE_TEXT, FIELD_TEXT};

pub const STAGE_SUMMARIZE: &str = "summarize";

/// Folds transcript entries into a rolling context window and emits one
/// accessibility summary per consumed entry.
///
/// The buffer is appended before the collaborator call, so a failed call
/// that gets re-delivered after a restart may contribute its text twice.
/// That costs a little repetition in the context window and nothing else.
pub struct SummarizeWorker {
    session_id: String,
    summarizer: Arc<dyn Summarizer>,
    buffer: RollingBuffer,
}

impl SummarizeWorker {
    pub fn new(
        session_id: impl Into<String>,
        summarizer: Arc<dyn Summarizer>,
        buffer: RollingBuffer,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            summarizer,
            buffer,
        }
    }
}

#[async_trait]
impl StageWorker for SummarizeWorker {
    fn name(&self) -> &'static str {
        STAGE_SUMMARIZE
    }

    async fn process(&mut self, entry: &LogEntry) -> Result<Option<FieldMap>, PipelineError> {
        let text = required_text_field(STAGE_SUMMARIZE, entry, FIELD_TEXT)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.buffer.append(text);
        info!(
            "Summarizing {} bytes of context for session '{}'",
            self.buffer.len(),
            self.session_id
        );
        let summary = self
            .summarizer
            .summarize(self.buffer.snapshot())
            .await
            .map_err(|source| PipelineError::Collaborator {
                stage: STAGE_SUMMARIZE,
                source,
            })?;

        let mut fields = FieldMap::new();
        fields.insert(
            FIELD_SIMPLE_TEXT.to_string(),
            Bytes::from(summary.simple_text),
        );
        fields.insert(
            FIELD_EXPANDED_TEXT.to_string(),
            Bytes::from(summary.expanded_text),
        );
        fields.insert(
            FIELD_NOTES_FOR_HEARING.to_string(),
            Bytes::from(summary.notes_for_hearing),
        );
        Ok(Some(fields))
    }
}
