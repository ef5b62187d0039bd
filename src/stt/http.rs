use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::SttConfig;

use super::Transcriber;

/// STT client posting raw audio to a transcription service.
///
/// The service contract is a bytes-in, `{"text": "..."}`-out POST
/// endpoint. Whatever container or encoding the audio uses travels
/// through opaquely.
pub struct HttpTranscriber {
    client: reqwest::Client,
    config: SttConfig,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl HttpTranscriber {
    pub fn new(config: SttConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build STT HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        if audio.is_empty() {
            return Ok(String::new());
        }

        debug!("Posting {} audio bytes to {}", audio.len(), self.config.url);
        let response = self
            .client
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await
            .context("STT request failed")?
            .error_for_status()
            .context("STT service returned an error status")?;

        let body: TranscriptionResponse = response
            .json()
            .await
            .context("STT response was not valid JSON")?;
        Ok(body.text.trim().to_string())
    }
}
