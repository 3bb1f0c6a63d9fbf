//! Static bus handler table.
//!
//! Subject convention: `<provider>.<consumer>.<verb>.<method>` --
//! this gateway is the `respondio` provider serving the `starfruit`
//! consumer. All request handlers live under the shared queue group so
//! that replicas compete for messages instead of each receiving every one.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use courier_core::dispatch::{HandlerSet, typed};
use courier_core::sync::api::ContactApi;
use courier_types::contact::ContactIdentifier;
use courier_types::error::HandlerFailure;
use courier_types::message::MessageContent;

/// Queue group shared by all gateway replicas.
pub const QUEUE_GROUP: &str = "RESPONDIO_GATEWAY_QUEUE";

/// Prefix for request/reply subjects served by this gateway.
pub const REQUEST_SUBJECT_PREFIX: &str = "respondio.starfruit.req";

/// Payload of `message.send`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub recipient_id: String,
    pub content: String,
}

/// Build the full registration table.
pub fn handler_sets<A: ContactApi>(api: Arc<A>) -> Vec<HandlerSet> {
    vec![
        HandlerSet::new(REQUEST_SUBJECT_PREFIX).register(typed(
            "message.send",
            move |payload: SendMessagePayload| {
                let api = Arc::clone(&api);
                async move { send_message(api.as_ref(), payload).await }
            },
        )),
    ]
}

/// Handle `message.send`: resolve the recipient, call the external API,
/// reply with the receipt.
async fn send_message<A: ContactApi>(
    api: &A,
    payload: SendMessagePayload,
) -> Result<Value, HandlerFailure> {
    info!(recipient = %payload.recipient_id, "received message send request");

    let identifier = ContactIdentifier::from_recipient(&payload.recipient_id)
        .map_err(|err| HandlerFailure::new("ValidationError", err.to_string()))?;

    let receipt = api
        .send_message(&identifier, &MessageContent::text(payload.content))
        .await?;

    info!(message_id = receipt.message_id, "message sent");
    Ok(json!({
        "messageId": receipt.message_id,
        "sentAt": Utc::now().to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::bus::client::{BusClient, BusError};
    use courier_core::bus::memory::InMemoryBus;
    use courier_core::dispatch::{Dispatcher, HandlerRegistry};
    use courier_core::sync::api::ListContactsQuery;
    use courier_types::contact::Contact;
    use courier_types::error::ApiError;
    use courier_types::message::{ContactMessage, SendReceipt};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Mock API recording send calls.
    #[derive(Default)]
    struct MockApi {
        sent: Mutex<Vec<(String, MessageContent)>>,
        fail_next: Mutex<Option<ApiError>>,
    }

    impl ContactApi for MockApi {
        async fn list_contacts(
            &self,
            _query: &ListContactsQuery,
        ) -> Result<Vec<Contact>, ApiError> {
            Ok(Vec::new())
        }

        async fn list_messages(
            &self,
            _contact: &ContactIdentifier,
            _limit: usize,
        ) -> Result<Vec<ContactMessage>, ApiError> {
            Ok(Vec::new())
        }

        async fn send_message(
            &self,
            contact: &ContactIdentifier,
            content: &MessageContent,
        ) -> Result<SendReceipt, ApiError> {
            if let Some(err) = self.fail_next.lock().unwrap().take() {
                return Err(err);
            }
            self.sent
                .lock()
                .unwrap()
                .push((contact.to_string(), content.clone()));
            Ok(SendReceipt { message_id: 555 })
        }
    }

    // The JoinSet must stay alive: dropping it aborts the receive loops.
    async fn start_gateway(
        api: Arc<MockApi>,
    ) -> (BusClient<InMemoryBus>, tokio::task::JoinSet<()>) {
        let bus = Arc::new(InMemoryBus::new());
        let registry = HandlerRegistry::build(handler_sets(api)).unwrap();
        let dispatcher = Dispatcher::new(Arc::clone(&bus), QUEUE_GROUP);
        let loops = dispatcher
            .start(registry, CancellationToken::new())
            .await
            .unwrap();
        (BusClient::new(bus), loops)
    }

    #[tokio::test]
    async fn send_message_replies_with_receipt() {
        let api = Arc::new(MockApi::default());
        let (client, _loops) = start_gateway(Arc::clone(&api)).await;

        let reply: Value = client
            .request(
                "respondio.starfruit.req.message.send",
                &json!({"recipientId": "user@example.com", "content": "hello"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(reply["messageId"], 555);
        assert!(reply["sentAt"].as_str().is_some());

        let sent = api.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "email:user@example.com");
        assert_eq!(sent[0].1, MessageContent::text("hello"));
    }

    #[tokio::test]
    async fn schema_violation_is_a_validation_error() {
        let api = Arc::new(MockApi::default());
        let (client, _loops) = start_gateway(Arc::clone(&api)).await;

        let err = client
            .request::<Value>(
                "respondio.starfruit.req.message.send",
                &json!({"content": "no recipient"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();

        match err {
            BusError::Rejected(data) => assert!(data.starts_with("Validation error:")),
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(api.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_recipient_is_a_validation_failure() {
        let api = Arc::new(MockApi::default());
        let (client, _loops) = start_gateway(Arc::clone(&api)).await;

        let err = client
            .request::<Value>(
                "respondio.starfruit.req.message.send",
                &json!({"recipientId": "no such recipient", "content": "x"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();

        match err {
            BusError::Rejected(data) => {
                let body: Value = serde_json::from_str(&data).unwrap();
                assert_eq!(body["name"], "ValidationError");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_failure_becomes_failure_envelope() {
        let api = Arc::new(MockApi::default());
        *api.fail_next.lock().unwrap() = Some(ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });
        let (client, _loops) = start_gateway(Arc::clone(&api)).await;

        let err = client
            .request::<Value>(
                "respondio.starfruit.req.message.send",
                &json!({"recipientId": "42", "content": "x"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();

        match err {
            BusError::Rejected(data) => {
                let body: Value = serde_json::from_str(&data).unwrap();
                assert_eq!(body["name"], "UpstreamApiError");
                assert!(body["message"].as_str().unwrap().contains("502"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
