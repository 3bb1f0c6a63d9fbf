//! Bus transport port.
//!
//! The gateway treats the bus connection lifecycle (connect, reconnect,
//! drain) as a given capability; this trait is the surface the dispatch and
//! client layers build on.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use courier_types::error::TransportError;

/// A message delivered by a subscription.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Concrete subject the message arrived on.
    pub subject: String,
    /// Raw payload bytes (UTF-8 JSON by convention).
    pub payload: Bytes,
    /// Reply subject for request-style messages; absent for plain events.
    pub reply_to: Option<String>,
}

/// Port to the concrete message bus.
///
/// Subscriptions are delivered through a bounded mailbox so receive loops
/// exert backpressure on the transport pump.
pub trait BusTransport: Send + Sync + 'static {
    /// Subscribe to a subject under a queue group (competing consumers:
    /// replicas sharing the group load-balance instead of each receiving
    /// every message).
    fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<InboundMessage>, TransportError>> + Send;

    /// Publish a message with no acknowledgement.
    fn publish(
        &self,
        subject: &str,
        payload: Bytes,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send a request and await the raw reply payload.
    ///
    /// Implementations must map an elapsed timeout to
    /// [`TransportError::Timeout`].
    fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> impl Future<Output = Result<Bytes, TransportError>> + Send;
}
