//! Periodic sync cycles with bounded fan-out.
//!
//! Every tick: fetch the contact list, filter it against the allow-list,
//! dedupe ids, and sync contacts in sequential batches; within a batch all
//! workers run concurrently, each wrapped individually in the rate-limit
//! retry wrapper, and the batch is joined regardless of individual
//! outcomes. A cycle guard serializes cycle starts: a tick (or a manual
//! trigger) arriving while the previous cycle is still running is skipped.
//! Dedup plus the guard give every contact key a single writer at a time.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use courier_types::config::PollingConfig;

use super::api::{ContactApi, ListContactsQuery};
use super::retry::execute_with_retry;
use super::sink::NewMessageSink;
use super::state::ContactStateStore;
use super::worker::sync_contact;

/// Result of one coordinator cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A previous cycle was still running; nothing was done.
    SkippedOverlap,
    /// The contact list could not be fetched; retried at the next tick.
    ListFailed,
    /// The cycle ran to completion.
    Completed {
        contacts: usize,
        synced: usize,
        skipped: usize,
    },
}

/// Drives periodic contact synchronization.
pub struct SyncCoordinator<A, S, K> {
    api: Arc<A>,
    store: Arc<S>,
    sink: Arc<K>,
    config: PollingConfig,
    cycle_guard: tokio::sync::Mutex<()>,
}

impl<A, S, K> SyncCoordinator<A, S, K>
where
    A: ContactApi,
    S: ContactStateStore,
    K: NewMessageSink,
{
    pub fn new(api: Arc<A>, store: Arc<S>, sink: Arc<K>, config: PollingConfig) -> Self {
        Self {
            api,
            store,
            sink,
            config,
            cycle_guard: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run the periodic loop until cancellation.
    ///
    /// When polling is disabled this returns immediately; manual cycles via
    /// [`run_cycle`](Self::run_cycle) remain available.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("message polling is disabled");
            return;
        }

        info!(
            interval_secs = self.config.interval_secs,
            batch_size = self.config.batch_size,
            allow_list = self.config.contacts.len(),
            "starting message polling"
        );

        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("sync loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// Run one full sync cycle.
    ///
    /// Safe to call concurrently with the periodic loop: the cycle guard
    /// ensures only one cycle runs at a time.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            warn!("previous sync cycle still running, skipping");
            return CycleOutcome::SkippedOverlap;
        };

        let contacts = match self.api.list_contacts(&ListContactsQuery::default()).await {
            Ok(contacts) => contacts,
            Err(err) => {
                error!(error = %err, "failed to fetch contact list, ending cycle");
                return CycleOutcome::ListFailed;
            }
        };
        debug!(count = contacts.len(), "fetched contact list");

        let ids = self.eligible_ids(contacts.iter().map(|c| c.id.to_string()));
        let total = ids.len();
        let mut synced = 0usize;
        let mut skipped = 0usize;

        for batch in ids.chunks(self.config.batch_size.max(1)) {
            let workers = batch.iter().map(|contact_id| {
                let label = format!("sync contact {contact_id}");
                async move {
                    execute_with_retry(&label, || {
                        sync_contact(
                            self.api.as_ref(),
                            self.store.as_ref(),
                            self.sink.as_ref(),
                            contact_id,
                            self.config.window_size,
                        )
                    })
                    .await
                }
            });

            for outcome in join_all(workers).await {
                match outcome {
                    Some(_) => synced += 1,
                    None => skipped += 1,
                }
            }
        }

        info!(contacts = total, synced, skipped, "sync cycle complete");
        CycleOutcome::Completed {
            contacts: total,
            synced,
            skipped,
        }
    }

    /// Apply the allow-list and drop duplicate ids while preserving order.
    ///
    /// Deduplication guarantees no two workers in flight share a contact
    /// key.
    fn eligible_ids(&self, ids: impl Iterator<Item = String>) -> Vec<String> {
        let allow: HashSet<&str> = self.config.contacts.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        ids.filter(|id| allow.is_empty() || allow.contains(id.as_str()))
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
