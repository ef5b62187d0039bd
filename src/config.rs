use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub stt: SttConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Knobs shared by every stage runner.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Max entries fetched per poll.
    #[serde(default = "default_poll_batch")]
    pub poll_batch: usize,
    /// How long a poll blocks before returning empty.
    #[serde(default = "default_poll_wait_ms")]
    pub poll_wait_ms: u64,
    /// Pause before restarting a stage after a transient failure.
    #[serde(default = "default_restart_backoff_ms")]
    pub restart_backoff_ms: u64,
    /// Cap on the rolling summarization context, in bytes.
    #[serde(default = "default_buffer_max_bytes")]
    pub buffer_max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SttConfig {
    pub url: String,
    #[serde(default = "default_stt_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_summarizer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl PipelineConfig {
    pub fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_wait_ms)
    }

    pub fn restart_backoff(&self) -> Duration {
        Duration::from_millis(self.restart_backoff_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_batch: default_poll_batch(),
            poll_wait_ms: default_poll_wait_ms(),
            restart_backoff_ms: default_restart_backoff_ms(),
            buffer_max_bytes: default_buffer_max_bytes(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_poll_batch() -> usize {
    10
}

fn default_poll_wait_ms() -> u64 {
    5000
}

fn default_restart_backoff_ms() -> u64 {
    2000
}

fn default_buffer_max_bytes() -> usize {
    2000
}

fn default_stt_timeout_secs() -> u64 {
    30
}

fn default_model() -> String {
    "phi3".to_string()
}

fn default_summarizer_timeout_secs() -> u64 {
    120
}
