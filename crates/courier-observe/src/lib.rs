//! Observability setup for the courier gateway.

pub mod tracing_setup;
