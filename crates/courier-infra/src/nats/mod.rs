//! NATS bus transport.

pub mod auth;
pub mod transport;

pub use auth::{BusAuth, resolve_auth};
pub use transport::NatsTransport;
