//! Infrastructure layer for the courier gateway.
//!
//! Contains the implementations of the ports defined in `courier-core`:
//! the NATS bus transport, the respond.io HTTP client, and the sink that
//! forwards discovered inbound messages onto the bus.

pub mod forward;
pub mod nats;
pub mod respond;
