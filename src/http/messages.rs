use anyhow::{Context, Result};
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Audio chunk carried in a websocket text frame
///
/// Binary frames are the normal transport; this wrapper exists for
/// clients that can only send JSON text.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioChunkMessage {
    pub chunk: String, // Base64-encoded audio bytes
}

impl AudioChunkMessage {
    pub fn encode(audio: &[u8]) -> Self {
        Self {
            chunk: base64::engine::general_purpose::STANDARD.encode(audio),
        }
    }

    pub fn decode(&self) -> Result<Bytes> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.chunk)
            .context("Audio chunk was not valid base64")?;
        Ok(Bytes::from(bytes))
    }
}
