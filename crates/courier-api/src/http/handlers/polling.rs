//! Polling control: manual sync trigger and status report.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use courier_core::sync::api::ContactApi;
use courier_core::sync::sink::NewMessageSink;
use courier_core::sync::state::ContactStateStore;

use crate::state::AppState;

/// POST /polling/manual-sync - trigger one sync cycle in the background.
///
/// Runs regardless of the polling-enabled flag; the cycle guard still
/// applies, so a trigger during a running cycle is skipped.
pub async fn manual_sync<A, S, K>(State(state): State<AppState<A, S, K>>) -> Json<Value>
where
    A: ContactApi,
    S: ContactStateStore,
    K: NewMessageSink,
{
    info!("manual sync triggered");
    let coordinator = Arc::clone(&state.coordinator);
    tokio::spawn(async move {
        coordinator.run_cycle().await;
    });

    Json(json!({
        "success": true,
        "message": "Manual global sync triggered. Check logs for details.",
    }))
}

/// GET /polling/status - polling configuration and cursor snapshot.
pub async fn polling_status<A, S, K>(State(state): State<AppState<A, S, K>>) -> Json<Value>
where
    A: ContactApi,
    S: ContactStateStore,
    K: NewMessageSink,
{
    let config = state.coordinator.config();
    let states: Vec<Value> = state
        .coordinator
        .store()
        .snapshot()
        .into_iter()
        .map(|s| {
            json!({
                "contactId": s.contact_id,
                "lastMessageId": s.last_message_id,
                "lastPolledAt": s.last_polled_at.to_rfc3339(),
            })
        })
        .collect();

    Json(json!({
        "isActive": config.enabled,
        "intervalSecs": config.interval_secs,
        "monitoredContacts": config.contacts.len(),
        "contacts": config.contacts,
        "contactStates": states,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
