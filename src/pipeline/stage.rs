use std::str;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::log::{FieldMap, LogEntry, LogReader, SessionLog};

use super::error::PipelineError;

/// Lifecycle of a supervised stage, observable through a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Starting,
    Running,
    Failed,
    Stopping,
    Stopped,
}

/// One pipeline transform: consumes entries from an input log and may
/// produce fields for an output log.
///
/// `Ok(Some(fields))` appends downstream and advances the cursor,
/// `Ok(None)` just advances (the entry produced nothing worth keeping),
/// and errors are split by [`PipelineError`]: malformed entries are
/// skipped with the cursor advanced, anything transient aborts the batch
/// with the cursor left on the failed entry so it is re-read later.
#[async_trait]
pub trait StageWorker: Send {
    fn name(&self) -> &'static str;

    async fn process(&mut self, entry: &LogEntry) -> Result<Option<FieldMap>, PipelineError>;
}

/// Drives one [`StageWorker`] over its input log.
///
/// The runner owns the cursor, so a failed `run` can be re-entered and
/// resumes exactly where the last acknowledged entry left it.
pub struct StageRunner<W: StageWorker> {
    worker: W,
    reader: LogReader,
    output: Arc<SessionLog>,
    poll_batch: usize,
    poll_wait: Duration,
    shutdown: watch::Receiver<bool>,
    state: watch::Sender<StageState>,
}

impl<W: StageWorker> StageRunner<W> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        worker: W,
        reader: LogReader,
        output: Arc<SessionLog>,
        poll_batch: usize,
        poll_wait: Duration,
        shutdown: watch::Receiver<bool>,
        state: watch::Sender<StageState>,
    ) -> Self {
        Self {
            worker,
            reader,
            output,
            poll_batch,
            poll_wait,
            shutdown,
            state,
        }
    }

    pub fn name(&self) -> &'static str {
        self.worker.name()
    }

    pub fn mark(&self, state: StageState) {
        let _ = self.state.send(state);
    }

    /// Runs until shutdown is requested (Ok) or a transient error needs a
    /// supervised restart (Err). Re-entrant: the cursor survives failures.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        self.mark(StageState::Running);
        debug!(
            "Stage '{}' consuming '{}' from position {}",
            self.name(),
            self.reader.log_name(),
            self.reader.position()
        );
        loop {
            if *self.shutdown.borrow() {
                self.mark(StageState::Stopping);
                return Ok(());
            }

            let batch = tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        self.mark(StageState::Stopping);
                        return Ok(());
                    }
                    continue;
                }
                polled = self.reader.poll(self.poll_batch, self.poll_wait) => polled?,
            };

            for entry in batch {
                match self.worker.process(&entry).await {
                    Ok(Some(fields)) => {
                        self.output.append(fields).await?;
                        self.reader.advance_to(entry.id);
                    }
                    Ok(None) => {
                        debug!(
                            "Stage '{}' produced nothing for entry {}, skipping",
                            self.name(),
                            entry.id
                        );
                        self.reader.advance_to(entry.id);
                    }
                    Err(err @ PipelineError::MalformedEntry { .. }) => {
                        warn!("Skipping {}", err);
                        self.reader.advance_to(entry.id);
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }
}

/// Looks up a required field, mapping absence to a malformed-entry error.
pub(crate) fn required_field<'e>(
    stage: &'static str,
    entry: &'e LogEntry,
    field: &'static str,
) -> Result<&'e Bytes, PipelineError> {
    entry.field(field).ok_or(PipelineError::MalformedEntry {
        stage,
        id: entry.id,
        field,
    })
}

/// Like [`required_field`] but also decodes the value as UTF-8.
pub(crate) fn required_text_field<'e>(
    stage: &'static str,
    entry: &'e LogEntry,
    field: &'static str,
) -> Result<&'e str, PipelineError> {
    let raw = required_field(stage, entry, field)?;
    str::from_utf8(raw).map_err(|_| PipelineError::MalformedEntry {
        stage,
        id: entry.id,
        field,
    })
}
