//! Wire types for the respond.io API.
//!
//! Only the fields the gateway consumes are modeled; everything else on the
//! wire is ignored.

use serde::{Deserialize, Serialize};

use courier_types::contact::Contact;
use courier_types::message::{ContactMessage, MessageContent};

/// Body of the send-message endpoint.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a MessageContent,
}

/// Single-page message list.
#[derive(Debug, Deserialize)]
pub struct MessageListResponse {
    #[serde(default)]
    pub items: Vec<ContactMessage>,
}

/// Single-page contact list.
#[derive(Debug, Deserialize)]
pub struct ContactListResponse {
    #[serde(default)]
    pub items: Vec<Contact>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_request_wraps_content_under_message() {
        let content = MessageContent::text("hi there");
        let body = serde_json::to_value(SendMessageRequest { message: &content }).unwrap();
        assert_eq!(body, json!({"message": {"type": "text", "text": "hi there"}}));
    }

    #[test]
    fn message_list_defaults_to_empty_items() {
        let parsed: MessageListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn contact_list_parses_items() {
        let parsed: ContactListResponse = serde_json::from_value(json!({
            "items": [{"id": 1, "firstName": "Ada"}, {"id": 2}],
            "pagination": {"next": null}
        }))
        .unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].id, 1);
    }
}
