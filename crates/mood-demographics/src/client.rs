//! Estimation sidecar HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::{DemographicsError, DemographicsResult};
use crate::types::{Estimate, EstimateRequest, EstimateResponse};

/// Configuration for the demographics client.
#[derive(Debug, Clone)]
pub struct DemographicsConfig {
    /// Base URL of the estimation sidecar.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl DemographicsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("DEMOGRAPHICS_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("DEMOGRAPHICS_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
        }
    }
}

/// Client for the age/gender estimation sidecar.
pub struct DemographicsClient {
    http: Client,
    config: DemographicsConfig,
}

impl DemographicsClient {
    /// Create a new client.
    pub fn new(config: DemographicsConfig) -> DemographicsResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DemographicsError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> DemographicsResult<Self> {
        Self::new(DemographicsConfig::from_env())
    }

    /// Run one estimation on a base64-encoded face crop.
    pub async fn estimate(&self, image_base64: &str) -> DemographicsResult<Estimate> {
        let url = format!("{}/analyze", self.config.base_url);
        debug!("Sending demographic estimation request to {}", url);

        let response = self
            .http
            .post(&url)
            .json(&EstimateRequest::new(image_base64))
            .send()
            .await
            .map_err(DemographicsError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DemographicsError::RequestFailed(format!(
                "estimator returned {}: {}",
                status, body
            )));
        }

        let parsed: EstimateResponse = response
            .json()
            .await
            .map_err(|e| DemographicsError::InvalidResponse(e.to_string()))?;
        Ok(parsed.into())
    }
}
