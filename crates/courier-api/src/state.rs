//! Shared application state for the HTTP surface.

use std::sync::Arc;

use courier_core::sync::api::ContactApi;
use courier_core::sync::coordinator::SyncCoordinator;
use courier_core::sync::sink::NewMessageSink;
use courier_core::sync::state::ContactStateStore;
use courier_types::config::Environment;

/// State handed to every HTTP handler.
///
/// Generic over the sync ports so handler tests can run against mocks; the
/// binary instantiates it with the real client, store, and forwarder.
pub struct AppState<A, S, K> {
    pub coordinator: Arc<SyncCoordinator<A, S, K>>,
    pub environment: Environment,
}

impl<A, S, K> Clone for AppState<A, S, K> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            environment: self.environment,
        }
    }
}

impl<A, S, K> AppState<A, S, K>
where
    A: ContactApi,
    S: ContactStateStore,
    K: NewMessageSink,
{
    pub fn new(coordinator: Arc<SyncCoordinator<A, S, K>>, environment: Environment) -> Self {
        Self {
            coordinator,
            environment,
        }
    }
}
