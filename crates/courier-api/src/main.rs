//! courier gateway entry point.
//!
//! Startup order: config -> tracing -> bus connection (fatal on failure)
//! -> handler registry (fatal on duplicates) -> dispatcher loops -> sync
//! coordinator -> HTTP server. Shutdown drains: stop accepting bus
//! messages, let in-flight handler invocations finish, then drain the
//! transport.

mod bus_handlers;
mod cli;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use courier_core::bus::client::BusClient;
use courier_core::dispatch::{Dispatcher, HandlerRegistry};
use courier_core::sync::coordinator::SyncCoordinator;
use courier_core::sync::state::InMemoryContactStateStore;
use courier_infra::forward::BusForwarder;
use courier_infra::nats::NatsTransport;
use courier_infra::respond::RespondClient;

use cli::Cli;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let enable_otel = args.enable_otel;
    let config = args.into_config()?;

    courier_observe::tracing_setup::init_tracing(enable_otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    info!(
        environment = %config.environment,
        port = config.port,
        polling_enabled = config.polling.enabled,
        "starting courier gateway"
    );

    // Bus connection; unreachable bus at startup is fatal.
    let transport = Arc::new(NatsTransport::connect(&config.bus, config.environment).await?);
    let bus_client = BusClient::new(Arc::clone(&transport));

    // External API client and sync engine.
    let api = Arc::new(RespondClient::new(&config.api));
    let store = Arc::new(InMemoryContactStateStore::new());
    let sink = Arc::new(BusForwarder::new(bus_client.clone()));
    let coordinator = Arc::new(SyncCoordinator::new(
        Arc::clone(&api),
        store,
        sink,
        config.polling.clone(),
    ));

    // Static handler table; a duplicate subject aborts startup.
    let registry = HandlerRegistry::build(bus_handlers::handler_sets(Arc::clone(&api)))?;
    info!(handlers = registry.len(), "handler registry built");

    let cancel = CancellationToken::new();
    let dispatcher = Dispatcher::new(Arc::clone(&transport), bus_handlers::QUEUE_GROUP);
    let mut receive_loops = dispatcher.start(registry, cancel.clone()).await?;

    let sync_loop = tokio::spawn(Arc::clone(&coordinator).run(cancel.clone()));

    // HTTP surface.
    let router = http::router::build_router(AppState::new(coordinator, config.environment));
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    // Drain: no new messages, in-flight handlers complete, then close.
    cancel.cancel();
    while receive_loops.join_next().await.is_some() {}
    let _ = sync_loop.await;
    transport.drain().await?;

    courier_observe::tracing_setup::shutdown_tracing();
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    cancel.cancel();
}
