//! Axum router configuration with middleware.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use courier_core::sync::api::ContactApi;
use courier_core::sync::sink::NewMessageSink;
use courier_core::sync::state::ContactStateStore;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete HTTP router with all routes and middleware.
pub fn build_router<A, S, K>(state: AppState<A, S, K>) -> Router
where
    A: ContactApi,
    S: ContactStateStore,
    K: NewMessageSink,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/webhook/respond-io", post(handlers::webhook::receive_webhook))
        .route("/HealthCheck", get(handlers::health::health_check))
        .route("/polling/manual-sync", post(handlers::polling::manual_sync))
        .route("/polling/status", get(handlers::polling::polling_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
