//! Per-contact incremental message discovery.
//!
//! Fetches the most recent fixed-size window of messages and advances the
//! contact's cursor. A contact with no cached cursor is a cold start: the
//! cursor is established at the newest message and nothing is forwarded,
//! so pre-existing history is never replayed. Messages that fell out of the
//! window since the last poll are not recovered; fixed-window polling is a
//! known coverage gap, kept as product behavior.

use tracing::{debug, info};

use courier_types::contact::ContactIdentifier;
use courier_types::error::ApiError;
use courier_types::message::Traffic;

use super::api::ContactApi;
use super::sink::NewMessageSink;
use super::state::{ContactStateStore, state_now};

/// What a sync pass did for one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The fetch window was empty; no state change.
    Empty,
    /// First sync: cursor established, nothing forwarded.
    ColdStart { latest_message_id: i64 },
    /// Warm sync: cursor advanced, new incoming messages forwarded.
    Synced {
        new_messages: usize,
        forwarded: usize,
    },
}

/// Sync one contact: fetch the window, advance the cursor, forward new
/// incoming messages.
pub async fn sync_contact<A, S, K>(
    api: &A,
    store: &S,
    sink: &K,
    contact_id: &str,
    window_size: usize,
) -> Result<SyncOutcome, ApiError>
where
    A: ContactApi,
    S: ContactStateStore,
    K: NewMessageSink,
{
    let identifier = ContactIdentifier::from_recipient(contact_id)
        .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;

    let window = api.list_messages(&identifier, window_size).await?;
    if window.is_empty() {
        debug!(%contact_id, "no messages in window");
        return Ok(SyncOutcome::Empty);
    }

    let latest_message_id = window
        .iter()
        .map(|m| m.message_id)
        .max()
        .unwrap_or_default();

    let Some(cached) = store.get(contact_id) else {
        info!(%contact_id, latest_message_id, "first sync, establishing cursor without forwarding");
        store.upsert(state_now(contact_id, latest_message_id));
        return Ok(SyncOutcome::ColdStart { latest_message_id });
    };

    let new_messages: Vec<_> = window
        .iter()
        .filter(|m| m.message_id > cached.last_message_id)
        .collect();

    // Cursor update is unconditional and never moves backwards.
    store.upsert(state_now(
        contact_id,
        latest_message_id.max(cached.last_message_id),
    ));

    let mut forwarded = 0usize;
    for message in &new_messages {
        if message.traffic == Traffic::Incoming {
            sink.handle(contact_id, message).await;
            forwarded += 1;
        }
    }

    if !new_messages.is_empty() {
        info!(
            %contact_id,
            new = new_messages.len(),
            forwarded,
            "found new message(s)"
        );
    }

    Ok(SyncOutcome::Synced {
        new_messages: new_messages.len(),
        forwarded,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
