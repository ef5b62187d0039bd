use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::session_log::SessionLog;

/// The three per-session topics, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Audio,
    Transcript,
    Summary,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Audio => "audio",
            Topic::Transcript => "transcript",
            Topic::Summary => "summary",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handles to one session's logs. Cloning shares the underlying logs.
#[derive(Clone)]
pub struct SessionLogs {
    pub audio: Arc<SessionLog>,
    pub transcript: Arc<SessionLog>,
    pub summary: Arc<SessionLog>,
}

impl SessionLogs {
    fn open(session_id: &str) -> Self {
        let log_for = |topic: Topic| {
            Arc::new(SessionLog::new(format!("{}:session:{}", topic, session_id)))
        };
        Self {
            audio: log_for(Topic::Audio),
            transcript: log_for(Topic::Transcript),
            summary: log_for(Topic::Summary),
        }
    }

    async fn close_all(&self) {
        self.audio.close().await;
        self.transcript.close().await;
        self.summary.close().await;
    }
}

/// Registry of per-session logs, keyed by session id.
///
/// Logs are created lazily on first touch and destroyed as a unit when the
/// session is removed. Removal closes them first so blocked readers wake
/// up instead of waiting out their poll budget.
pub struct LogStore {
    sessions: RwLock<HashMap<String, SessionLogs>>,
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the session's logs, creating them on first access.
    pub async fn open_session(&self, session_id: &str) -> SessionLogs {
        if let Some(logs) = self.sessions.read().await.get(session_id) {
            return logs.clone();
        }
        let mut sessions = self.sessions.write().await;
        if let Some(logs) = sessions.get(session_id) {
            return logs.clone();
        }
        info!("Opening logs for session '{}'", session_id);
        let logs = SessionLogs::open(session_id);
        sessions.insert(session_id.to_string(), logs.clone());
        logs
    }

    /// Logs for an existing session, if any. Never creates.
    pub async fn get(&self, session_id: &str) -> Option<SessionLogs> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Closes and removes the session's logs. Returns false when the
    /// session was unknown.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(logs) => {
                logs.close_all().await;
                debug!("Removed logs for session '{}'", session_id);
                true
            }
            None => false,
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}
