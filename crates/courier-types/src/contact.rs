//! Contact identity and per-contact sync cursor state.
//!
//! A contact is addressed at the external API by a typed identifier string:
//! `email:<addr>`, `phone:<number>`, or `id:<integer>`. The sync engine keeps
//! one [`ContactState`] per contact for the lifetime of the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recipient string that could not be turned into a contact identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid recipient '{0}': expected an email, a +-prefixed phone number, or a numeric id")]
pub struct InvalidRecipient(pub String);

/// Typed contact identifier understood by the external API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactIdentifier {
    Email(String),
    Phone(String),
    Id(i64),
}

impl ContactIdentifier {
    /// Classify a free-form recipient string.
    ///
    /// Contains `@` -> email; starts with `+` -> phone; anything else must
    /// parse as an integer contact id.
    pub fn from_recipient(recipient: &str) -> Result<Self, InvalidRecipient> {
        if recipient.contains('@') {
            return Ok(Self::Email(recipient.to_string()));
        }
        if recipient.starts_with('+') {
            return Ok(Self::Phone(recipient.to_string()));
        }
        recipient
            .parse::<i64>()
            .map(Self::Id)
            .map_err(|_| InvalidRecipient(recipient.to_string()))
    }
}

impl std::fmt::Display for ContactIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email(addr) => write!(f, "email:{addr}"),
            Self::Phone(number) => write!(f, "phone:{number}"),
            Self::Id(id) => write!(f, "id:{id}"),
        }
    }
}

/// A contact as returned by the external API's contact list.
///
/// Unknown fields on the wire are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Per-contact sync cursor.
///
/// `last_message_id` is non-decreasing across updates for a given contact.
/// State lives for the process lifetime only; a restart causes a fresh
/// cold-start sync per contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactState {
    pub contact_id: String,
    pub last_message_id: i64,
    pub last_polled_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
