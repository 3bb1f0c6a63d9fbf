//! Per-subject receive loops: decode, validate, invoke, reply.
//!
//! Each registered subject gets its own long-lived task subscribed under the
//! shared queue group. Within a loop, messages are processed strictly
//! in order -- message N's reply is sent before message N+1 is decoded.
//! Loops on distinct subjects run fully concurrently. A malformed payload or
//! a failing handler produces a failure envelope and the loop continues; the
//! loop only ends on cancellation or when the transport closes the
//! subscription.

use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use courier_types::envelope::Envelope;
use courier_types::error::{HandlerFailure, TransportError};

use super::registry::{HandlerRegistry, RegisteredHandler};
use crate::bus::transport::{BusTransport, InboundMessage};

/// Serves every subject in a [`HandlerRegistry`] over a bus transport.
pub struct Dispatcher<B: BusTransport> {
    transport: Arc<B>,
    queue_group: String,
}

impl<B: BusTransport> Dispatcher<B> {
    pub fn new(transport: Arc<B>, queue_group: impl Into<String>) -> Self {
        Self {
            transport,
            queue_group: queue_group.into(),
        }
    }

    /// Subscribe every registered subject and spawn its receive loop.
    ///
    /// A subscription failure here is a startup error; no loops are left
    /// running. The returned [`JoinSet`] completes once every loop has
    /// stopped (after cancellation, in-flight invocations drain first).
    pub async fn start(
        &self,
        registry: HandlerRegistry,
        cancel: CancellationToken,
    ) -> Result<JoinSet<()>, TransportError> {
        let mut loops = JoinSet::new();

        for (subject, entry) in registry.into_entries() {
            let rx = self.transport.subscribe(&subject, &self.queue_group).await?;
            info!(%subject, queue_group = %self.queue_group, "subscribed");

            let transport = Arc::clone(&self.transport);
            let cancel = cancel.clone();
            loops.spawn(serve_subject(transport, subject, entry, rx, cancel));
        }

        Ok(loops)
    }
}

/// One subject's receive loop.
async fn serve_subject<B: BusTransport>(
    transport: Arc<B>,
    subject: String,
    entry: RegisteredHandler,
    mut rx: tokio::sync::mpsc::Receiver<InboundMessage>,
    cancel: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => break,
            maybe = rx.recv() => match maybe {
                Some(msg) => msg,
                None => break,
            },
        };

        debug!(%subject, "received message");
        let envelope = process_message(&subject, &entry, &msg.payload).await;

        match msg.reply_to {
            Some(reply_to) => {
                let body = match serde_json::to_vec(&envelope) {
                    Ok(body) => body,
                    Err(err) => {
                        warn!(%subject, error = %err, "failed to serialize reply envelope");
                        continue;
                    }
                };
                if let Err(err) = transport.publish(&reply_to, Bytes::from(body)).await {
                    warn!(%subject, error = %err, "failed to send reply");
                }
            }
            None => {
                // Event-style message; the envelope has nowhere to go.
                debug!(%subject, success = envelope.success, "no reply subject");
            }
        }
    }

    info!(%subject, "receive loop stopped");
}

/// Decode, validate, and invoke. Never fails the loop -- every outcome is an
/// envelope.
async fn process_message(
    subject: &str,
    entry: &RegisteredHandler,
    payload: &[u8],
) -> Envelope {
    let value: serde_json::Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(%subject, error = %err, "payload decode failed");
            return Envelope::failure(&HandlerFailure::new("DecodeError", err.to_string()));
        }
    };

    if let Some(schema) = &entry.schema {
        if let Err(field_messages) = schema.validate(&value) {
            warn!(%subject, errors = %field_messages.join("; "), "payload validation failed");
            return Envelope::validation_failure(&field_messages);
        }
    }

    match (entry.handler)(value).await {
        Ok(data) => Envelope::ok(data),
        Err(failure) => {
            warn!(%subject, failure = %failure, "handler failed");
            Envelope::failure(&failure)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::client::{BusClient, BusError};
    use crate::bus::memory::InMemoryBus;
    use crate::dispatch::handler::{HandlerSet, raw, typed};
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Deserialize)]
    struct SendPayload {
        #[serde(rename = "recipientId")]
        recipient_id: String,
        #[allow(dead_code)]
        content: String,
    }

    struct Harness {
        bus: Arc<InMemoryBus>,
        client: BusClient<InMemoryBus>,
        cancel: CancellationToken,
        loops: JoinSet<()>,
    }

    async fn start(sets: Vec<HandlerSet>) -> Harness {
        let bus = Arc::new(InMemoryBus::new());
        let registry = crate::dispatch::registry::HandlerRegistry::build(sets).unwrap();
        let dispatcher = Dispatcher::new(Arc::clone(&bus), "TEST_QUEUE");
        let cancel = CancellationToken::new();
        let loops = dispatcher.start(registry, cancel.clone()).await.unwrap();
        Harness {
            client: BusClient::new(Arc::clone(&bus)),
            bus,
            cancel,
            loops,
        }
    }

    #[tokio::test]
    async fn handler_success_yields_success_envelope() {
        let h = start(vec![HandlerSet::new("svc").register(raw("echo", |v| async move {
            Ok(json!({"got": v}))
        }))])
        .await;

        let reply: Value = h
            .client
            .request("svc.echo", &json!(7), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply["got"], 7);
    }

    #[tokio::test]
    async fn handler_error_yields_message_and_name() {
        let h = start(vec![HandlerSet::new("svc").register(raw("boom", |_| async move {
            Err(HandlerFailure::error("boom"))
        }))])
        .await;

        let err = h
            .client
            .request::<Value>("svc.boom", &json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();
        match err {
            BusError::Rejected(data) => {
                let body: Value = serde_json::from_str(&data).unwrap();
                assert_eq!(body["message"], "boom");
                assert_eq!(body["name"], "Error");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_failure_skips_handler() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let spy = Arc::clone(&invocations);
        let h = start(vec![HandlerSet::new("svc").register(typed(
            "send",
            move |payload: SendPayload| {
                let spy = Arc::clone(&spy);
                async move {
                    spy.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"to": payload.recipient_id}))
                }
            },
        ))])
        .await;

        // recipientId has the wrong type
        let err = h
            .client
            .request::<Value>(
                "svc.send",
                &json!({"recipientId": 5, "content": "hi"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        match err {
            BusError::Rejected(data) => {
                assert!(data.starts_with("Validation error:"), "got: {data}");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(invocations.load(Ordering::SeqCst), 0);

        // A conforming payload still goes through afterwards.
        let reply: Value = h
            .client
            .request(
                "svc.send",
                &json!({"recipientId": "42", "content": "hi"}),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(reply["to"], "42");
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_json_yields_decode_failure_and_loop_survives() {
        let h = start(vec![HandlerSet::new("svc").register(raw("op", |v| async move {
            Ok(v)
        }))])
        .await;

        // Raw request bypassing the client's serializer.
        let reply = h
            .bus
            .request(
                "svc.op",
                Bytes::from_static(b"{not json"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        let envelope: Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["data"]["name"], "DecodeError");

        // The loop keeps consuming.
        let reply: Value = h
            .client
            .request("svc.op", &json!("still alive"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, json!("still alive"));
    }

    #[tokio::test]
    async fn slow_subject_does_not_block_other_subjects() {
        let h = start(vec![
            HandlerSet::root().register(raw("slow.op", |v| async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(v)
            })),
            HandlerSet::root().register(raw("fast.op", |v| async move { Ok(v) })),
        ])
        .await;

        // Fire the slow request without awaiting its reply.
        let slow_client = h.client.clone();
        let slow = tokio::spawn(async move {
            slow_client
                .request::<Value>("slow.op", &json!(1), Duration::from_secs(2))
                .await
        });

        // The fast subject answers while the slow handler is still running.
        let started = tokio::time::Instant::now();
        let reply: Value = h
            .client
            .request("fast.op", &json!(2), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, json!(2));
        assert!(started.elapsed() < Duration::from_millis(400));

        slow.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn in_order_single_flight_per_subject() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&order);
        let h = start(vec![HandlerSet::root().register(raw("seq.op", move |v: Value| {
            let log = Arc::clone(&log);
            async move {
                let n = v.as_u64().unwrap();
                // The first message dawdles; later ones must still wait.
                if n == 0 {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                log.lock().unwrap().push(n);
                Ok(v)
            }
        }))])
        .await;

        for n in 0..3u64 {
            h.client.publish("seq.op", &json!(n)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn cancellation_stops_loops() {
        let mut h = start(vec![HandlerSet::root().register(raw("op.x", |v| async move {
            Ok(v)
        }))])
        .await;

        h.cancel.cancel();
        while h.loops.join_next().await.is_some() {}
    }
}
