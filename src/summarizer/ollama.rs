use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SummarizerConfig;

use super::{AccessibilitySummary, Summarizer};

/// Summarizer backed by an Ollama generate endpoint.
///
/// The model is asked for a strict JSON object. Models drift, so parsing
/// is forgiving: missing keys become empty strings, non-string values are
/// stringified, and a reply that is not JSON at all degrades to passing
/// the raw context through as both text renderings.
pub struct OllamaSummarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build summarizer HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, context: &str) -> Result<AccessibilitySummary> {
        if context.trim().is_empty() {
            return Ok(AccessibilitySummary::default());
        }

        let prompt = build_prompt(context);
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: &prompt,
            stream: false,
        };

        debug!(
            "Requesting summary from {} (model '{}', {} bytes of context)",
            self.config.url,
            self.config.model,
            context.len()
        );
        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .context("Summarizer request failed")?
            .error_for_status()
            .context("Summarizer returned an error status")?;

        let body: GenerateResponse = response
            .json()
            .await
            .context("Summarizer response was not valid JSON")?;
        Ok(parse_summary(body.response.trim(), context))
    }
}

fn build_prompt(context: &str) -> String {
    format!(
        "You assist deaf and hard-of-hearing students following a live lecture.\n\
         Rewrite the transcript below as a JSON object with exactly these keys:\n\
         - \"simple_text\": one or two short, plain sentences with the key point\n\
         - \"expanded_text\": a fuller summary keeping names, numbers and structure\n\
         - \"notes_for_hearing\": non-speech audio cues worth knowing, or \"\" if none\n\
         Reply with the JSON object only, no prose around it.\n\n\
         Transcript:\n{}",
        context
    )
}

/// Maps whatever the model replied with onto a complete summary.
fn parse_summary(raw: &str, context: &str) -> AccessibilitySummary {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => AccessibilitySummary {
            simple_text: text_value(map.get("simple_text")),
            expanded_text: text_value(map.get("expanded_text")),
            notes_for_hearing: text_value(map.get("notes_for_hearing")),
        },
        _ => {
            warn!("Summarizer reply was not a JSON object, passing context through");
            AccessibilitySummary {
                simple_text: context.to_string(),
                expanded_text: context.to_string(),
                notes_for_hearing: String::new(),
            }
        }
    }
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string(),
    }
}
