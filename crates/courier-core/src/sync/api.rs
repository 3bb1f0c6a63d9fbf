//! Port to the external contact-messaging API.

use serde::Serialize;
use serde_json::Value;

use courier_types::contact::{Contact, ContactIdentifier};
use courier_types::error::ApiError;
use courier_types::message::{ContactMessage, MessageContent, SendReceipt};

/// Query for the contact list. The API returns a single page; pagination is
/// the external collaborator's concern.
#[derive(Debug, Clone, Serialize)]
pub struct ListContactsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub filter: Value,
}

impl Default for ListContactsQuery {
    fn default() -> Self {
        Self {
            timezone: None,
            filter: Value::Object(serde_json::Map::new()),
        }
    }
}

/// Operations the gateway performs against the external API.
///
/// The API owns the data; the gateway never mutates messages, only sends
/// new ones and reads.
pub trait ContactApi: Send + Sync + 'static {
    /// Fetch the contact list (single page).
    fn list_contacts(
        &self,
        query: &ListContactsQuery,
    ) -> impl Future<Output = Result<Vec<Contact>, ApiError>> + Send;

    /// Fetch the most recent `limit` messages for a contact, API-ordered.
    fn list_messages(
        &self,
        contact: &ContactIdentifier,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ContactMessage>, ApiError>> + Send;

    /// Send a message to a contact.
    fn send_message(
        &self,
        contact: &ContactIdentifier,
        content: &MessageContent,
    ) -> impl Future<Output = Result<SendReceipt, ApiError>> + Send;
}
