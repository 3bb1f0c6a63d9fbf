//! Forwards discovered inbound messages onto the bus.
//!
//! Each new incoming message becomes a fire-and-forget event on the
//! `message.received` subject. Publish failures are logged and swallowed:
//! a bus hiccup must not fail the sync worker that discovered the message.

use serde_json::json;
use tracing::{info, warn};

use courier_core::bus::client::BusClient;
use courier_core::bus::transport::BusTransport;
use courier_core::sync::sink::NewMessageSink;
use courier_types::message::ContactMessage;

/// Subject that inbound messages are published on.
pub const INBOUND_MESSAGE_SUBJECT: &str = "respondio.starfruit.evt.message.received";

/// [`NewMessageSink`] that publishes to the bus.
pub struct BusForwarder<B: BusTransport> {
    client: BusClient<B>,
    subject: String,
}

impl<B: BusTransport> BusForwarder<B> {
    pub fn new(client: BusClient<B>) -> Self {
        Self {
            client,
            subject: INBOUND_MESSAGE_SUBJECT.to_string(),
        }
    }

    /// Override the event subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

impl<B: BusTransport> NewMessageSink for BusForwarder<B> {
    async fn handle(&self, contact_id: &str, message: &ContactMessage) {
        let event = json!({
            "contactId": contact_id,
            "messageId": message.message_id,
            "traffic": message.traffic,
            "message": message.message,
        });

        match self.client.publish(&self.subject, &event).await {
            Ok(()) => info!(
                %contact_id,
                message_id = message.message_id,
                subject = %self.subject,
                "forwarded inbound message"
            ),
            Err(err) => warn!(
                %contact_id,
                message_id = message.message_id,
                error = %err,
                "failed to forward inbound message"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
