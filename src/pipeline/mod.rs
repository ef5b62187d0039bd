//! The per-session processing pipeline
//!
//! Four stages connected only through the session's logs:
//! - `IngestStage` - audio source attachment, appends chunks verbatim
//! - `TranscribeWorker` - audio chunks to transcript text
//! - `SummarizeWorker` - transcript text to accessibility summaries over
//!   a rolling context window
//! - `DeliverStage` - viewer attachment, replays then tails summaries
//!
//! `PipelineSupervisor` owns the sessions and keeps the two transform
//! stages running, restarting them after transient collaborator failures
//! without moving their cursors.

mod buffer;
mod deliver;
mod error;
mod ingest;
mod stage;
mod summarize;
mod supervisor;
mod transcribe;

pub use buffer::RollingBuffer;
pub use deliver::{DeliverStage, SummaryMessage, ViewerSink};
pub use error::PipelineError;
pub use ingest::IngestStage;
pub use stage::{StageState, StageWorker};
pub use summarize::SummarizeWorker;
pub use supervisor::{PipelineSupervisor, SessionStats};
pub use transcribe::TranscribeWorker;

/// Field carrying raw audio bytes in the audio log.
pub const FIELD_CHUNK: &str = "chunk";
/// Field carrying transcript text in the transcript log.
pub const FIELD_TEXT: &str = "text";
/// Summary log fields, one per accessibility rendering.
pub const FIELD_SIMPLE_TEXT: &str = "simple_text";
pub const FIELD_EXPANDED_TEXT: &str = "expanded_text";
pub const FIELD_NOTES_FOR_HEARING: &str = "notes_for_hearing";
