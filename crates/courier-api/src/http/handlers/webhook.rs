//! Webhook receiver: pure log-and-acknowledge passthrough.
//!
//! The external API's webhook payloads are accepted without validation and
//! acknowledged with a receipt timestamp. Processing inbound messages is
//! the polling engine's job; this endpoint only exists so the API has
//! somewhere to deliver.

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::info;

/// POST /webhook/respond-io - acknowledge an incoming webhook.
pub async fn receive_webhook(Json(payload): Json<Value>) -> Json<Value> {
    info!(payload = %payload, "webhook received");
    Json(ack(Utc::now()))
}

fn ack(now: chrono::DateTime<Utc>) -> Value {
    json!({
        "status": "received",
        "timestamp": now.to_rfc3339(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn any_payload_is_acknowledged() {
        let Json(body) = receive_webhook(Json(json!({"whatever": [1, 2, 3]}))).await;
        assert_eq!(body["status"], "received");
        assert!(body["timestamp"].as_str().is_some());
    }

    #[test]
    fn ack_carries_rfc3339_timestamp() {
        let now = Utc::now();
        let body = ack(now);
        assert_eq!(body["timestamp"], now.to_rfc3339());
    }
}
