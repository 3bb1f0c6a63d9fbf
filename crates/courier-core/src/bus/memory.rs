//! In-process bus transport.
//!
//! Routes published messages to subscribers through [`match_subject`], so
//! in-process routing agrees exactly with the real transport's native
//! subscription matching. Queue groups compete: members of the same
//! (pattern, group) pair receive messages round-robin. Request/reply uses
//! generated `_INBOX.` subjects with oneshot reply channels.
//!
//! Used by tests across the workspace; never by the production wiring.

use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;
use uuid::Uuid;

use courier_types::error::TransportError;

use super::transport::{BusTransport, InboundMessage};
use crate::subject::{self, match_subject};

/// Mailbox capacity per subscriber.
const SUBSCRIPTION_BUFFER: usize = 256;

struct GroupEntry {
    pattern: String,
    group: String,
    members: Vec<mpsc::Sender<InboundMessage>>,
    /// Round-robin cursor for competing-consumer delivery.
    next: usize,
}

/// In-memory [`BusTransport`] implementation.
#[derive(Default)]
pub struct InMemoryBus {
    groups: Mutex<Vec<GroupEntry>>,
    /// Pending request inboxes: inbox subject -> reply sender.
    inboxes: DashMap<String, oneshot::Sender<Bytes>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn deliver(&self, subject: &str, payload: Bytes, reply_to: Option<String>) {
        // Reply subjects short-circuit to their pending inbox.
        if let Some((_, tx)) = self.inboxes.remove(subject) {
            let _ = tx.send(payload);
            return;
        }

        let mut groups = self.groups.lock().expect("bus group table poisoned");
        for entry in groups.iter_mut() {
            if !match_subject(&entry.pattern, subject) {
                continue;
            }
            // Rotate through live members; closed mailboxes are pruned.
            while !entry.members.is_empty() {
                let idx = entry.next % entry.members.len();
                let msg = InboundMessage {
                    subject: subject.to_string(),
                    payload: payload.clone(),
                    reply_to: reply_to.clone(),
                };
                match entry.members[idx].try_send(msg) {
                    Ok(()) => {
                        entry.next = idx + 1;
                        break;
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            pattern = %entry.pattern,
                            group = %entry.group,
                            "subscriber mailbox full, message dropped"
                        );
                        break;
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        entry.members.remove(idx);
                    }
                }
            }
        }
        groups.retain(|entry| !entry.members.is_empty());
    }
}

impl BusTransport for InMemoryBus {
    async fn subscribe(
        &self,
        pattern: &str,
        queue_group: &str,
    ) -> Result<mpsc::Receiver<InboundMessage>, TransportError> {
        subject::validate(pattern).map_err(TransportError::Operation)?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut groups = self.groups.lock().expect("bus group table poisoned");
        if let Some(entry) = groups
            .iter_mut()
            .find(|e| e.pattern == pattern && e.group == queue_group)
        {
            entry.members.push(tx);
        } else {
            groups.push(GroupEntry {
                pattern: pattern.to_string(),
                group: queue_group.to_string(),
                members: vec![tx],
                next: 0,
            });
        }
        Ok(rx)
    }

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError> {
        self.deliver(subject, payload, None);
        Ok(())
    }

    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, TransportError> {
        let inbox = format!("_INBOX.{}", Uuid::now_v7());
        let (tx, rx) = oneshot::channel();
        self.inboxes.insert(inbox.clone(), tx);

        self.deliver(subject, payload, Some(inbox.clone()));

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => {
                self.inboxes.remove(&inbox);
                Err(TransportError::Operation(
                    "reply channel closed without response".to_string(),
                ))
            }
            Err(_) => {
                self.inboxes.remove(&inbox);
                Err(TransportError::Timeout(timeout))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
