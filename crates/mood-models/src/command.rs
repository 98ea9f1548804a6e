//! Inbound control messages.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A JSON control message from the client, distinguished from frame
/// payloads by its leading `{`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Start (or restart) a calibration cycle.
    Calibrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calibrate() {
        let cmd: ClientCommand = serde_json::from_str(r#"{"action": "calibrate"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Calibrate);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"action": "reset"}"#).is_err());
    }
}
