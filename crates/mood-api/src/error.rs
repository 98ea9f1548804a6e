//! Session error types.

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

/// Per-message failures inside a WebSocket session. None of these are
/// fatal: a bad frame is logged and skipped, and the session continues.
/// Collaborator failures (landmarks, demographics) never surface here;
/// they degrade to a no-detection result or a stale cache at the call
/// site.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Frame payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Frame payload is not a decodable image: {0}")]
    ImageDecode(#[from] image::ImageError),
}
