use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::log::{LogEntry, LogError, LogReader};
use crate::summarizer::AccessibilitySummary;

use super::error::PipelineError;
use super::stage::required_text_field;
use super::supervisor::ViewerGuard;
use super::{FIELD_EXPANDED_TEXT, FIELD_NOTES_FOR_HEARING, FIELD_SIMPLE_TEXT};

pub const STAGE_DELIVER: &str = "deliver";

/// The summary payload viewers receive, one per summary log entry.
///
/// Field names are the contract with viewer clients; renderers pick
/// between the variants based on the user's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMessage {
    pub simple_text: String,
    pub expanded_text: String,
    pub notes_for_hearing: String,
}

impl From<AccessibilitySummary> for SummaryMessage {
    fn from(summary: AccessibilitySummary) -> Self {
        Self {
            simple_text: summary.simple_text,
            expanded_text: summary.expanded_text,
            notes_for_hearing: summary.notes_for_hearing,
        }
    }
}

/// Where a delivery run pushes its messages.
#[async_trait]
pub trait ViewerSink: Send {
    async fn send(&mut self, message: SummaryMessage) -> Result<(), PipelineError>;
}

/// Attachment for one viewer connection.
///
/// Every viewer gets a private cursor starting before the first entry, so
/// a late join replays the session's whole summary history and then tails
/// live. Viewers never interfere with each other or with the log.
pub struct DeliverStage {
    session_id: String,
    reader: LogReader,
    poll_batch: usize,
    poll_wait: Duration,
    shutdown: watch::Receiver<bool>,
    _viewer: ViewerGuard,
}

impl DeliverStage {
    pub(crate) fn new(
        session_id: impl Into<String>,
        reader: LogReader,
        poll_batch: usize,
        poll_wait: Duration,
        shutdown: watch::Receiver<bool>,
        viewer: ViewerGuard,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            reader,
            poll_batch,
            poll_wait,
            shutdown,
            _viewer: viewer,
        }
    }

    /// Forwards summary entries into `sink` until the session ends (Ok) or
    /// the sink reports the viewer gone (Err). Malformed entries are
    /// skipped; they were appended by us, so they should not exist.
    pub async fn run<S: ViewerSink>(mut self, sink: &mut S) -> Result<(), PipelineError> {
        loop {
            if *self.shutdown.borrow() {
                return Ok(());
            }

            let batch = tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        return Ok(());
                    }
                    continue;
                }
                polled = self.reader.poll(self.poll_batch, self.poll_wait) => match polled {
                    Ok(batch) => batch,
                    Err(LogError::Closed(_)) => {
                        debug!(
                            "Summary log for session '{}' closed, ending delivery",
                            self.session_id
                        );
                        return Ok(());
                    }
                },
            };

            for entry in batch {
                match summary_message(&entry) {
                    Ok(message) => sink.send(message).await?,
                    Err(err) => warn!("Skipping {}", err),
                }
                self.reader.advance_to(entry.id);
            }
        }
    }
}

fn summary_message(entry: &LogEntry) -> Result<SummaryMessage, PipelineError> {
    Ok(SummaryMessage {
        simple_text: required_text_field(STAGE_DELIVER, entry, FIELD_SIMPLE_TEXT)?.to_string(),
        expanded_text: required_text_field(STAGE_DELIVER, entry, FIELD_EXPANDED_TEXT)?.to_string(),
        notes_for_hearing: required_text_field(STAGE_DELIVER, entry, FIELD_NOTES_FOR_HEARING)?
            .to_string(),
    })
}
