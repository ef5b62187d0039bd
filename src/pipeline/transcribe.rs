use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use crate::log::{FieldMap, LogEntry};
use crate::stt::Transcriber;

use super::error::PipelineError;
use super::stage::{required_field, StageWorker};
use super::{FIELD_CHUNK, FIELD_TEXT};

pub const STAGE_TRANSCRIBE: &str = "transcribe";

/// Turns audio chunk entries into transcript text entries.
///
/// Empty chunks and empty transcription results are dropped without
/// producing output, so the transcript log only ever carries text.
pub struct TranscribeWorker {
    session_id: String,
    transcriber: Arc<dyn Transcriber>,
}

impl TranscribeWorker {
    pub fn new(session_id: impl Into<String>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            session_id: session_id.into(),
            transcriber,
        }
    }
}

#[async_trait]
impl StageWorker for TranscribeWorker {
    fn name(&self) -> &'static str {
        STAGE_TRANSCRIBE
    }

    async fn process(&mut self, entry: &LogEntry) -> Result<Option<FieldMap>, PipelineError> {
        let chunk = required_field(STAGE_TRANSCRIBE, entry, FIELD_CHUNK)?;
        if chunk.is_empty() {
            return Ok(None);
        }

        let text = self
            .transcriber
            .transcribe(chunk)
            .await
            .map_err(|source| PipelineError::Collaborator {
                stage: STAGE_TRANSCRIBE,
                source,
            })?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        info!(
            "Transcribed {} byte chunk for session '{}': {}",
            chunk.len(),
            self.session_id,
            preview(text)
        );
        let mut fields = FieldMap::new();
        fields.insert(FIELD_TEXT.to_string(), Bytes::from(text.to_string()));
        Ok(Some(fields))
    }
}

fn preview(text: &str) -> String {
    let mut shortened: String = text.chars().take(80).collect();
    if shortened.len() < text.len() {
        shortened.push('…');
    }
    shortened
}
