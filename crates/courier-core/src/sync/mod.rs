//! Rate-limited polling synchronization engine.
//!
//! The coordinator ticks on an interval, enumerates contacts, and fans out
//! per-contact sync workers in bounded batches. Each worker discovers new
//! messages incrementally against an in-memory cursor and forwards incoming
//! ones through the [`sink::NewMessageSink`] port.

pub mod api;
pub mod coordinator;
pub mod retry;
pub mod sink;
pub mod state;
pub mod worker;

pub use api::{ContactApi, ListContactsQuery};
pub use coordinator::{CycleOutcome, SyncCoordinator};
pub use retry::execute_with_retry;
pub use sink::NewMessageSink;
pub use state::{ContactStateStore, InMemoryContactStateStore};
pub use worker::{SyncOutcome, sync_contact};
