//! [`BusTransport`] implementation over `async-nats`.
//!
//! The connection reconnects indefinitely and retries the initial connect;
//! connection state changes are logged through the client's event callback.
//! Subscriptions are pumped into bounded mailboxes so receive loops see the
//! same interface as the in-memory transport.

use std::sync::Arc;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, Event};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use courier_core::bus::transport::{BusTransport, InboundMessage};
use courier_types::config::{BusConfig, Environment};
use courier_types::error::TransportError;

use super::auth::{BusAuth, resolve_auth};

/// Mailbox capacity per subscription.
const SUBSCRIPTION_BUFFER: usize = 256;

/// NATS-backed bus transport.
pub struct NatsTransport {
    client: Client,
}

impl NatsTransport {
    /// Connect to the configured servers with the environment's auth mode.
    ///
    /// Startup connect failure is fatal to the caller; once connected the
    /// client reconnects on its own indefinitely.
    pub async fn connect(
        config: &BusConfig,
        environment: Environment,
    ) -> Result<Self, TransportError> {
        let servers = config.servers.join(",");
        info!(%servers, %environment, "connecting to bus");

        let mut options = ConnectOptions::new()
            .retry_on_initial_connect()
            .event_callback(|event| async move {
                match event {
                    Event::Connected => info!("bus connected"),
                    Event::Disconnected => warn!("bus disconnected"),
                    Event::LameDuckMode => info!("bus requested reconnect (lame duck mode)"),
                    other => debug!(event = %other, "bus event"),
                }
            });

        options = match resolve_auth(config, environment).await? {
            BusAuth::None => options,
            BusAuth::UserPassword { user, password } => options.user_and_password(user, password),
            BusAuth::Jwt { jwt, seed } => {
                let key_pair = Arc::new(
                    nkeys::KeyPair::from_seed(&seed)
                        .map_err(|e| TransportError::Connection(format!("invalid bus seed: {e}")))?,
                );
                options.jwt(jwt, move |nonce| {
                    let key_pair = Arc::clone(&key_pair);
                    async move {
                        key_pair
                            .sign(&nonce)
                            .map_err(async_nats::AuthError::new)
                    }
                })
            }
        };

        let client = options
            .connect(servers)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        info!("bus connection established");
        Ok(Self { client })
    }

    /// Stop accepting new messages and flush in-flight ones, then close.
    pub async fn drain(&self) -> Result<(), TransportError> {
        info!("draining bus connection");
        self.client
            .drain()
            .await
            .map_err(|e| TransportError::Operation(e.to_string()))?;
        info!("bus connection drained");
        Ok(())
    }

    /// Whether the connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.client.connection_state() == async_nats::connection::State::Connected
    }
}

impl BusTransport for NatsTransport {
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<mpsc::Receiver<InboundMessage>, TransportError> {
        let mut subscription = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| TransportError::Operation(e.to_string()))?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let subject = subject.to_string();
        tokio::spawn(async move {
            while let Some(msg) = subscription.next().await {
                let inbound = InboundMessage {
                    subject: msg.subject.to_string(),
                    payload: msg.payload,
                    reply_to: msg.reply.map(|s| s.to_string()),
                };
                if tx.send(inbound).await.is_err() {
                    // Receive loop is gone; stop pumping.
                    break;
                }
            }
            debug!(%subject, "subscription pump stopped");
        });

        Ok(rx)
    }

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| TransportError::Operation(e.to_string()))
    }

    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, TransportError> {
        let request = self.client.request(subject.to_string(), payload);
        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(reply)) => Ok(reply.payload),
            Ok(Err(err)) if err.kind() == async_nats::RequestErrorKind::TimedOut => {
                Err(TransportError::Timeout(timeout))
            }
            Ok(Err(err)) => Err(TransportError::Operation(err.to_string())),
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }
}
