use crate::pipeline::PipelineSupervisor;
use crate::settings::SettingsStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session pipelines and their logs
    pub supervisor: Arc<PipelineSupervisor>,
    /// Per-session accessibility settings
    pub settings: Arc<SettingsStore>,
}

impl AppState {
    pub fn new(supervisor: Arc<PipelineSupervisor>, settings: Arc<SettingsStore>) -> Self {
        Self {
            supervisor,
            settings,
        }
    }
}
