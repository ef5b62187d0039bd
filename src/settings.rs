//! Per-session accessibility settings
//!
//! Stored by the HTTP API so viewer clients can persist how a user wants
//! summaries rendered. The pipeline itself always produces every
//! rendering; these settings drive the client side.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// How much simplification the user wants applied when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "very simple")]
    VerySimple,
    #[default]
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "detailed")]
    Detailed,
}

/// Accessibility needs a user can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileNeed {
    Dyslexia,
    Dysgraphia,
    Dyscalculia,
    HearingImpairment,
}

/// One user's rendering preferences for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub profile: Vec<ProfileNeed>,
}

/// In-memory settings keyed by session id. Last write wins.
pub struct SettingsStore {
    entries: RwLock<HashMap<String, UserSettings>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn set(&self, session_id: &str, settings: UserSettings) {
        self.entries
            .write()
            .await
            .insert(session_id.to_string(), settings);
    }

    pub async fn get(&self, session_id: &str) -> Option<UserSettings> {
        self.entries.read().await.get(session_id).cloned()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
