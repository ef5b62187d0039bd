use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use echonotes::config::PipelineConfig;
use echonotes::{
    AccessibilitySummary, PipelineError, PipelineSupervisor, SummaryMessage, Summarizer,
    Transcriber, ViewerSink,
};
use tokio::time::sleep;
use tracing::info;

/// Stands in for the STT service; the demo chunks are just UTF-8 text.
struct EchoTranscriber;

#[async_trait]
impl Transcriber for EchoTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(audio).to_string())
    }
}

/// Stands in for the summarizer model.
struct TemplateSummarizer;

#[async_trait]
impl Summarizer for TemplateSummarizer {
    async fn summarize(&self, context: &str) -> Result<AccessibilitySummary> {
        Ok(AccessibilitySummary {
            simple_text: format!("So far: {}", context),
            expanded_text: context.to_string(),
            notes_for_hearing: String::new(),
        })
    }
}

struct StdoutSink;

#[async_trait]
impl ViewerSink for StdoutSink {
    async fn send(&mut self, message: SummaryMessage) -> Result<(), PipelineError> {
        info!("📝 Summary: {}", message.simple_text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("🧪 Running the pipeline end to end with scripted collaborators");

    // 1. Supervisor with snappy polling so the demo finishes quickly
    let config = PipelineConfig {
        poll_wait_ms: 100,
        restart_backoff_ms: 200,
        ..Default::default()
    };
    let supervisor = Arc::new(PipelineSupervisor::new(
        config,
        Arc::new(EchoTranscriber),
        Arc::new(TemplateSummarizer),
    ));

    // 2. Attach a viewer first so it tails summaries as they appear
    let viewer = supervisor.attach_viewer("demo").await;
    let viewer_task = tokio::spawn(async move {
        let mut sink = StdoutSink;
        let _ = viewer.run(&mut sink).await;
    });
    info!("✅ Viewer attached");

    // 3. Push a short lecture as audio chunks
    let source = supervisor.attach_source("demo").await;
    for line in [
        "The water cycle begins with evaporation.",
        "Clouds form as the vapor condenses.",
        "Rain returns the water to the ground.",
    ] {
        source.push_chunk(Bytes::from(line)).await?;
        info!("📤 Pushed chunk: {}", line);
        sleep(Duration::from_millis(300)).await;
    }

    // 4. Let the stages drain, then end the session
    sleep(Duration::from_secs(1)).await;
    if let Some(stats) = supervisor.session_stats("demo").await {
        info!(
            "📊 {} audio, {} transcript, {} summary entries",
            stats.audio_entries, stats.transcript_entries, stats.summary_entries
        );
    }
    supervisor.end_session("demo").await;
    viewer_task.await?;
    info!("✅ Session ended cleanly");

    Ok(())
}
