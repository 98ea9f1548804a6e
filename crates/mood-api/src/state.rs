//! Application state.

use std::sync::Arc;

use mood_demographics::DemographicsClient;
use mood_engine::landmarks::{DisabledLandmarkProvider, LandmarkProvider};

use crate::config::ApiConfig;

/// Shared application state. Per-session pipeline state is built fresh in
/// the WebSocket handler; only collaborator handles are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub landmarks: Arc<dyn LandmarkProvider>,
    pub demographics: Arc<DemographicsClient>,
}

impl AppState {
    /// Create new application state with the disabled landmark fallback.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let demographics = DemographicsClient::from_env()?;
        Ok(Self {
            config,
            landmarks: Arc::new(DisabledLandmarkProvider::new()),
            demographics: Arc::new(demographics),
        })
    }

    /// Wire in a concrete landmark provider.
    pub fn with_landmark_provider(mut self, provider: Arc<dyn LandmarkProvider>) -> Self {
        self.landmarks = provider;
        self
    }
}
