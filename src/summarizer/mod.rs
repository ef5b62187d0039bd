//! Accessibility summarization collaborator
//!
//! Turns a window of transcript context into the three renderings viewer
//! clients choose between. The pipeline depends on the `Summarizer`
//! trait; the production implementation talks to a local Ollama model.

mod ollama;

use anyhow::Result;
use async_trait::async_trait;

pub use ollama::OllamaSummarizer;

/// One summarization result. All three renderings always travel
/// together; ones the model did not produce are empty strings rather
/// than absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessibilitySummary {
    /// Short, plain-language rendering for reduced reading load.
    pub simple_text: String,
    /// Fuller rendering that keeps detail and structure.
    pub expanded_text: String,
    /// Cues about non-speech audio relevant to hearing-impaired users.
    pub notes_for_hearing: String,
}

/// Summarizes accumulated transcript context.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, context: &str) -> Result<AccessibilitySummary>;
}
