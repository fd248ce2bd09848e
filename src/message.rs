use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ClipboardItem;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedData {
    pub device_id: Uuid,
}

/// The broadcast payload: a 1:1 projection of a just-persisted item.
/// Constructed fresh per broadcast, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardUpdateData {
    pub item_id: Uuid,
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    pub content_type: String,
    pub device_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&ClipboardItem> for ClipboardUpdateData {
    fn from(item: &ClipboardItem) -> Self {
        Self {
            item_id: item.id,
            encrypted_content: item.encrypted_content.clone(),
            iv: item.iv.clone(),
            content_hash: item.content_hash.clone(),
            content_type: item.content_type.to_string(),
            device_id: item.device_id,
            created_at: item.created_at,
        }
    }
}

/// Server→client messages on the live connection.
///
/// Tagged on `type`, with `data`/`timestamp` at the top level:
/// `{"type":"clipboard_update","data":{...},"timestamp":"..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        data: ConnectedData,
        timestamp: DateTime<Utc>,
    },
    ClipboardUpdate {
        data: ClipboardUpdateData,
        timestamp: DateTime<Utc>,
    },
    Ping {
        timestamp: DateTime<Utc>,
    },
    /// Reply to a client ping; the timestamp is echoed back verbatim.
    Pong {
        timestamp: Value,
    },
}

impl ServerMessage {
    pub fn connected(device_id: Uuid) -> Self {
        ServerMessage::Connected {
            data: ConnectedData { device_id },
            timestamp: Utc::now(),
        }
    }

    pub fn clipboard_update(item: &ClipboardItem) -> Self {
        ServerMessage::ClipboardUpdate {
            data: ClipboardUpdateData::from(item),
            timestamp: Utc::now(),
        }
    }

    pub fn ping() -> Self {
        ServerMessage::Ping {
            timestamp: Utc::now(),
        }
    }

    pub fn pong(echoed: Value) -> Self {
        ServerMessage::Pong { timestamp: echoed }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound application messages a session understands.
#[derive(Debug, Clone)]
pub enum ClientMessage {
    /// Liveness probe from the client; server echoes the timestamp back.
    Ping { timestamp: Value },
    /// Acknowledgment of a server ping; payload ignored.
    Pong,
    /// Anything with an unrecognized `type`. Logged and dropped, never fatal.
    Unknown(String),
}

/// Parse an inbound text frame. Returns None for frames that are not JSON
/// objects with a string `type` field.
pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    let value: Value = serde_json::from_str(text).ok()?;
    let kind = value.get("type")?.as_str()?;
    match kind {
        "ping" => Some(ClientMessage::Ping {
            timestamp: value.get("timestamp").cloned().unwrap_or(Value::Null),
        }),
        "pong" => Some(ClientMessage::Pong),
        other => Some(ClientMessage::Unknown(other.to_string())),
    }
}
