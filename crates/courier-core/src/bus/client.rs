//! Typed request/publish client over the bus transport.
//!
//! `request` performs a request-with-timeout and unwraps the reply
//! [`Envelope`]; a `success: false` reply becomes [`BusError::Rejected`]
//! carrying the embedded data, distinct from a transport-level
//! [`BusError::Timeout`]. `publish` is fire-and-forget.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use courier_types::envelope::Envelope;
use courier_types::error::TransportError;

use super::transport::BusTransport;

/// Default request timeout, matching the bus's conventional 10s.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from typed bus exchanges.
#[derive(Debug, Error)]
pub enum BusError {
    /// The responder replied with `success: false`; carries the embedded
    /// `data`, stringified if it was not already a string.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// No reply arrived within the timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The payload could not be serialized or the reply could not be
    /// decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// Underlying transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Typed outbound client for request/reply and fire-and-forget publish.
pub struct BusClient<B: BusTransport> {
    transport: Arc<B>,
}

impl<B: BusTransport> Clone for BusClient<B> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<B: BusTransport> BusClient<B> {
    pub fn new(transport: Arc<B>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<B> {
        &self.transport
    }

    /// Send a request and decode the reply envelope's `data` as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        subject: &str,
        payload: &impl Serialize,
        timeout: Duration,
    ) -> Result<T, BusError> {
        let bytes = serde_json::to_vec(payload).map_err(|e| BusError::Codec(e.to_string()))?;

        let reply = match self
            .transport
            .request(subject, Bytes::from(bytes), timeout)
            .await
        {
            Ok(reply) => reply,
            Err(TransportError::Timeout(elapsed)) => return Err(BusError::Timeout(elapsed)),
            Err(err) => return Err(BusError::Transport(err)),
        };

        let envelope: Envelope =
            serde_json::from_slice(&reply).map_err(|e| BusError::Codec(e.to_string()))?;

        if !envelope.success {
            return Err(BusError::Rejected(envelope.data_as_string()));
        }

        serde_json::from_value(envelope.data).map_err(|e| BusError::Codec(e.to_string()))
    }

    /// Publish an event with no acknowledgement. Only transport-level
    /// failures surface; there is no delivery guarantee.
    pub async fn publish(
        &self,
        subject: &str,
        payload: &impl Serialize,
    ) -> Result<(), TransportError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| TransportError::Operation(format!("serialize: {e}")))?;
        debug!(%subject, "publishing event");
        self.transport.publish(subject, Bytes::from(bytes)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
