//! WebSocket message types: envelope and client commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope of every WebSocket frame, in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-chosen ID on commands, echoed on the response; server-generated
    /// on events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server frame stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error frame.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    /// Serializes the frame; an unserializable frame becomes an empty string.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client to server command.
    Command,
    /// Server reply to a command.
    Response,
    /// Server broadcast of an economy event.
    Event,
    /// Server error report.
    Error,
}

/// Commands a client can send in the payload of a `command` frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow events of the given accounts; `"*"` follows all.
    Subscribe {
        /// Account UUIDs or `"*"`.
        account_ids: Vec<String>,
    },
    /// Stop following the given accounts; `"*"` clears the wildcard.
    Unsubscribe {
        /// Account UUIDs or `"*"`.
        account_ids: Vec<String>,
    },
    /// Current market snapshot.
    GetMarket,
    /// Current overview of one account.
    GetAccount {
        /// Account UUID.
        account_id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_parses() {
        let Ok(msg) = serde_json::from_str::<WsMessage>(
            r#"{"id":"1","type":"command","payload":{"command":"subscribe","account_ids":["*"]}}"#,
        ) else {
            panic!("envelope did not parse");
        };
        let Ok(WsCommand::Subscribe { account_ids }) = serde_json::from_value(msg.payload) else {
            panic!("command did not parse");
        };
        assert_eq!(account_ids, vec!["*".to_string()]);
    }

    #[test]
    fn error_frame_shape() {
        let json = WsMessage::error("x", 400, "bad").to_json();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"code\":400"));
    }
}
