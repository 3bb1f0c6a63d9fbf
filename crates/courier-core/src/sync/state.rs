//! Per-contact cursor store.
//!
//! The store is key-scoped: the coordinator never runs two workers for the
//! same contact concurrently, so each key has a single writer at any moment
//! and no per-key locking is needed. State is process-lifetime only; a
//! restart loses every cursor and the next cycle cold-starts each contact.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use courier_types::contact::ContactState;

/// Key-scoped access to per-contact sync cursors.
pub trait ContactStateStore: Send + Sync + 'static {
    /// The cached state for a contact, if any.
    fn get(&self, contact_id: &str) -> Option<ContactState>;

    /// Insert or replace a contact's state.
    fn upsert(&self, state: ContactState);

    /// All cached states, ordered by contact id (for status reporting).
    fn snapshot(&self) -> Vec<ContactState>;
}

/// In-memory store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryContactStateStore {
    states: DashMap<String, ContactState>,
}

impl InMemoryContactStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl ContactStateStore for InMemoryContactStateStore {
    fn get(&self, contact_id: &str) -> Option<ContactState> {
        self.states.get(contact_id).map(|entry| entry.clone())
    }

    fn upsert(&self, state: ContactState) {
        self.states.insert(state.contact_id.clone(), state);
    }

    fn snapshot(&self) -> Vec<ContactState> {
        let mut states: Vec<ContactState> =
            self.states.iter().map(|entry| entry.value().clone()).collect();
        states.sort_by(|a, b| a.contact_id.cmp(&b.contact_id));
        states
    }
}

/// Build a fresh state record for `contact_id` polled now.
pub fn state_now(contact_id: &str, last_message_id: i64) -> ContactState {
    ContactState {
        contact_id: contact_id.to_string(),
        last_message_id,
        last_polled_at: now(),
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
