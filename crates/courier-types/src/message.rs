//! Message shapes used by the sync engine and the send operation.
//!
//! The external API is the source of truth for messages; the gateway never
//! mutates them. Message content is a tagged variant over the types the
//! gateway understands, with an opaque fallback so unrecognized types are
//! forwarded as-is rather than dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direction of a message relative to the external API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traffic {
    /// Sent by the contact; candidate for forwarding onto the bus.
    Incoming,
    /// Sent by us through the API; never forwarded back.
    Outgoing,
}

/// Message content variants the gateway understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KnownContent {
    Text { text: String },
    Attachment { url: String },
}

/// Message content: a known variant, or an opaque payload carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Known(KnownContent),
    Opaque(Value),
}

impl MessageContent {
    /// Convenience constructor for a plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Known(KnownContent::Text { text: text.into() })
    }

    /// The content's `type` tag, if present.
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            Self::Known(KnownContent::Text { .. }) => Some("text"),
            Self::Known(KnownContent::Attachment { .. }) => Some("attachment"),
            Self::Opaque(value) => value.get("type").and_then(Value::as_str),
        }
    }
}

/// One message in a contact's conversation, as listed by the external API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// Monotonic message identifier assigned by the external API.
    pub message_id: i64,
    pub traffic: Traffic,
    pub message: MessageContent,
}

/// Acknowledgement returned by the send operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub message_id: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
