pub mod config;
pub mod http;
pub mod log;
pub mod pipeline;
pub mod settings;
pub mod stt;
pub mod summarizer;

pub use config::Config;
pub use http::{create_router, AppState, AudioChunkMessage};
pub use log::{
    EntryId, FieldMap, LogEntry, LogError, LogReader, LogStore, SessionLog, SessionLogs, Topic,
};
pub use pipeline::{
    PipelineError, PipelineSupervisor, RollingBuffer, SessionStats, StageState, SummaryMessage,
    ViewerSink,
};
pub use settings::{Difficulty, ProfileNeed, SettingsStore, UserSettings};
pub use stt::{HttpTranscriber, Transcriber};
pub use summarizer::{AccessibilitySummary, OllamaSummarizer, Summarizer};
