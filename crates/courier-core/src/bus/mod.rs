//! Bus port and clients.
//!
//! [`transport::BusTransport`] is the seam to the concrete bus; the
//! infrastructure layer implements it over the real connection, and
//! [`memory::InMemoryBus`] implements it in-process for tests.

pub mod client;
pub mod memory;
pub mod transport;

pub use client::{BusClient, BusError};
pub use memory::InMemoryBus;
pub use transport::{BusTransport, InboundMessage};
