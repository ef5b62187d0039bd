use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::log::{LogReader, LogStore, SessionLog, SessionLogs};
use crate::stt::Transcriber;
use crate::summarizer::Summarizer;

use super::buffer::RollingBuffer;
use super::deliver::DeliverStage;
use super::ingest::IngestStage;
use super::stage::{StageRunner, StageState, StageWorker};
use super::summarize::SummarizeWorker;
use super::transcribe::TranscribeWorker;

/// Point-in-time view of one session, served by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,

    /// Whether the pipeline is still being supervised. False only in the
    /// window where every stage has stopped but the session lingers.
    pub is_running: bool,

    /// When the session's pipeline started
    pub started_at: DateTime<Utc>,

    pub audio_entries: usize,
    pub transcript_entries: usize,
    pub summary_entries: usize,
    pub transcribe_state: StageState,
    pub summarize_state: StageState,

    /// Number of attached viewer connections
    pub viewers: usize,
}

/// Decrements the session's viewer count when a delivery attachment is
/// dropped, however it ends.
pub(crate) struct ViewerGuard {
    viewers: Arc<AtomicUsize>,
}

impl ViewerGuard {
    fn new(viewers: Arc<AtomicUsize>) -> Self {
        viewers.fetch_add(1, Ordering::SeqCst);
        Self { viewers }
    }
}

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        self.viewers.fetch_sub(1, Ordering::SeqCst);
    }
}

struct StageHandle {
    name: &'static str,
    state: watch::Receiver<StageState>,
    task: JoinHandle<()>,
}

struct SessionPipeline {
    started_at: DateTime<Utc>,
    shutdown: watch::Sender<bool>,
    transcribe: StageHandle,
    summarize: StageHandle,
    viewers: Arc<AtomicUsize>,
}

/// Owns every live session: its logs, its two supervised transform
/// stages, and the attachment points connections hang off.
///
/// Sessions start lazily on first touch and every stage runs as its own
/// task, so one session stalling on a collaborator never blocks another.
/// A stage that fails transiently restarts after a fixed backoff with its
/// cursor unmoved, re-reading whatever it had not acknowledged.
pub struct PipelineSupervisor {
    config: PipelineConfig,
    logs: LogStore,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
    sessions: RwLock<HashMap<String, SessionPipeline>>,
}

impl PipelineSupervisor {
    pub fn new(
        mut config: PipelineConfig,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        // A zero batch would turn every poll into an instant empty read.
        config.poll_batch = config.poll_batch.max(1);
        Self {
            config,
            logs: LogStore::new(),
            transcriber,
            summarizer,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Starts the session's pipeline if it is not already running and
    /// returns handles to its logs.
    pub async fn ensure_session(&self, session_id: &str) -> SessionLogs {
        let mut sessions = self.sessions.write().await;
        let logs = self.logs.open_session(session_id).await;
        if !sessions.contains_key(session_id) {
            sessions.insert(session_id.to_string(), self.start_pipeline(session_id, &logs));
        }
        logs
    }

    /// Attaches an audio source to the session, starting it on demand.
    pub async fn attach_source(&self, session_id: &str) -> IngestStage {
        let logs = self.ensure_session(session_id).await;
        IngestStage::new(session_id, logs.audio.clone())
    }

    /// Attaches a viewer to the session, starting it on demand. The
    /// returned stage replays the summary log from the beginning.
    pub async fn attach_viewer(&self, session_id: &str) -> DeliverStage {
        let mut sessions = self.sessions.write().await;
        let logs = self.logs.open_session(session_id).await;
        let pipeline = match sessions.entry(session_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.start_pipeline(session_id, &logs)),
        };
        DeliverStage::new(
            session_id,
            LogReader::new(logs.summary.clone()),
            self.config.poll_batch,
            self.config.poll_wait(),
            pipeline.shutdown.subscribe(),
            ViewerGuard::new(pipeline.viewers.clone()),
        )
    }

    /// Stops the session's stages, closes its logs and forgets it.
    /// Returns false when no such session was running; ending twice is
    /// harmless.
    pub async fn end_session(&self, session_id: &str) -> bool {
        // The session map and the log store are updated under one hold of
        // the sessions lock, so a racing re-create sees either both
        // present or neither and can never adopt the dying logs.
        let pipeline = {
            let mut sessions = self.sessions.write().await;
            let Some(pipeline) = sessions.remove(session_id) else {
                debug!("Ignoring end for unknown session '{}'", session_id);
                return false;
            };
            info!("Ending session '{}'", session_id);
            let _ = pipeline.shutdown.send(true);
            self.logs.remove_session(session_id).await;
            pipeline
        };

        // Closing the logs wakes stages blocked in a poll; aborting also
        // cancels any in-flight collaborator call. Log appends have no
        // await point mid-mutation, so cancellation cannot tear one.
        for handle in [pipeline.transcribe, pipeline.summarize] {
            handle.task.abort();
            if let Err(err) = handle.task.await {
                if !err.is_cancelled() {
                    error!(
                        "Stage '{}' for session '{}' panicked during shutdown: {}",
                        handle.name, session_id, err
                    );
                }
            }
        }
        info!("Session '{}' ended", session_id);
        true
    }

    /// Stats for a running session, or None when it is unknown.
    pub async fn session_stats(&self, session_id: &str) -> Option<SessionStats> {
        let sessions = self.sessions.read().await;
        let pipeline = sessions.get(session_id)?;
        let logs = self.logs.get(session_id).await?;
        let transcribe_state = *pipeline.transcribe.state.borrow();
        let summarize_state = *pipeline.summarize.state.borrow();
        Some(SessionStats {
            session_id: session_id.to_string(),
            is_running: transcribe_state != StageState::Stopped
                || summarize_state != StageState::Stopped,
            started_at: pipeline.started_at,
            audio_entries: logs.audio.entry_count().await,
            transcript_entries: logs.transcript.entry_count().await,
            summary_entries: logs.summary.entry_count().await,
            transcribe_state,
            summarize_state,
            viewers: pipeline.viewers.load(Ordering::SeqCst),
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Ends every running session. Used on process shutdown.
    pub async fn shutdown_all(&self) {
        let session_ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        for session_id in session_ids {
            self.end_session(&session_id).await;
        }
    }

    fn start_pipeline(&self, session_id: &str, logs: &SessionLogs) -> SessionPipeline {
        info!("Starting pipeline for session '{}'", session_id);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let transcribe = self.spawn_stage(
            session_id,
            TranscribeWorker::new(session_id, self.transcriber.clone()),
            LogReader::new(logs.audio.clone()),
            logs.transcript.clone(),
            shutdown_rx.clone(),
        );
        let summarize = self.spawn_stage(
            session_id,
            SummarizeWorker::new(
                session_id,
                self.summarizer.clone(),
                RollingBuffer::new(self.config.buffer_max_bytes),
            ),
            LogReader::new(logs.transcript.clone()),
            logs.summary.clone(),
            shutdown_rx,
        );

        SessionPipeline {
            started_at: Utc::now(),
            shutdown: shutdown_tx,
            transcribe,
            summarize,
            viewers: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn spawn_stage<W: StageWorker + 'static>(
        &self,
        session_id: &str,
        worker: W,
        reader: LogReader,
        output: Arc<SessionLog>,
        shutdown: watch::Receiver<bool>,
    ) -> StageHandle {
        let (state_tx, state_rx) = watch::channel(StageState::Starting);
        let name = worker.name();
        let session = session_id.to_string();
        let backoff = self.config.restart_backoff();
        let mut observer = shutdown.clone();
        let mut runner = StageRunner::new(
            worker,
            reader,
            output,
            self.config.poll_batch,
            self.config.poll_wait(),
            shutdown,
            state_tx,
        );

        let task = tokio::spawn(async move {
            loop {
                match runner.run().await {
                    Ok(()) => break,
                    Err(err) if err.is_transient() => {
                        if *observer.borrow() {
                            break;
                        }
                        warn!(
                            "Stage '{}' for session '{}' failed ({}), restarting in {:?}",
                            name, session, err, backoff
                        );
                        runner.mark(StageState::Failed);
                        tokio::select! {
                            _ = tokio::time::sleep(backoff) => {}
                            _ = observer.changed() => {}
                        }
                        if *observer.borrow() {
                            break;
                        }
                    }
                    Err(err) => {
                        error!(
                            "Stage '{}' for session '{}' stopped on unrecoverable error: {}",
                            name, session, err
                        );
                        break;
                    }
                }
            }
            runner.mark(StageState::Stopped);
            debug!("Stage '{}' for session '{}' stopped", name, session);
        });

        StageHandle {
            name,
            state: state_rx,
            task,
        }
    }
}
