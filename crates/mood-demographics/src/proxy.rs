//! Per-session demographic estimation proxy.
//!
//! Estimation is expensive and demographics change slowly, so the proxy
//! throttles hard: every 30 frames until the first estimate lands, every
//! 300 after. At most one request is in flight per session. Workers are
//! detached; their only link back is a bounded completion channel that the
//! session drains at the top of each iteration, so there is no shared
//! mutable cache to race on, and a completion arriving after session end
//! dies with the channel.

use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::RgbImage;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use mood_models::UserProfile;

use crate::client::DemographicsClient;
use crate::error::{DemographicsError, DemographicsResult};
use crate::types::Estimate;

/// Dispatch cadence before any estimate has arrived.
pub const INITIAL_INTERVAL: u64 = 30;
/// Dispatch cadence once an estimate is cached.
pub const STEADY_INTERVAL: u64 = 300;

/// Completion message from a worker: `None` means the attempt failed and
/// the cache stays as it was. Sent on every outcome so the in-flight flag
/// cannot wedge.
type Completion = Option<Estimate>;

/// Throttled, at-most-one-in-flight demographic estimation for one session.
pub struct DemographicProxy {
    client: Arc<DemographicsClient>,
    profile: UserProfile,
    in_flight: bool,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl DemographicProxy {
    pub fn new(client: Arc<DemographicsClient>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            client,
            profile: UserProfile::scanning(),
            in_flight: false,
            tx,
            rx,
        }
    }

    /// Last known profile (sentinels until the first estimate lands).
    pub fn profile(&self) -> UserProfile {
        self.profile.clone()
    }

    pub fn has_estimate(&self) -> bool {
        self.profile.age != mood_models::AGE_SCANNING
    }

    /// Drain any completed estimation. Called by the session at the start
    /// of each iteration, before the next frame is processed.
    pub fn poll(&mut self) {
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = false;
            if let Some(estimate) = completion {
                debug!(age = %estimate.age, gender = %estimate.gender, "Demographic estimate updated");
                self.profile = UserProfile::new(estimate.age, estimate.gender);
            }
        }
    }

    /// Whether this frame falls on a dispatch boundary and no request is
    /// already in flight.
    pub fn should_dispatch(&self, frame_count: u64) -> bool {
        if self.in_flight || frame_count == 0 {
            return false;
        }
        let interval = if self.has_estimate() {
            STEADY_INTERVAL
        } else {
            INITIAL_INTERVAL
        };
        frame_count % interval == 0
    }

    /// Fire-and-forget an estimation on a face crop. The worker reports
    /// back through the completion channel whatever happens.
    pub fn dispatch(&mut self, crop: RgbImage) {
        self.in_flight = true;
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = match run_estimate(&client, crop).await {
                Ok(estimate) => Some(estimate),
                Err(e) => {
                    warn!("Demographic estimation failed: {}", e);
                    None
                }
            };
            // Session gone -> channel closed -> result discarded.
            let _ = tx.send(outcome).await;
        });
    }
}

async fn run_estimate(
    client: &DemographicsClient,
    crop: RgbImage,
) -> DemographicsResult<Estimate> {
    let encoded = encode_crop(&crop)?;
    client.estimate(&encoded).await
}

/// PNG-encode and base64 a face crop for the wire.
fn encode_crop(crop: &RgbImage) -> DemographicsResult<String> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(crop.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .map_err(|e| DemographicsError::Encode(e.to_string()))?;
    Ok(BASE64.encode(buf))
}
