//! Speech-to-text collaborator
//!
//! The pipeline only sees the `Transcriber` trait; the production
//! implementation posts audio bytes to an external STT service over HTTP.

mod http;

use anyhow::Result;
use async_trait::async_trait;

pub use http::HttpTranscriber;

/// Converts one chunk of audio into text.
///
/// Implementations return an empty string for silence or undecodable
/// audio; errors are reserved for the collaborator itself failing.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}
