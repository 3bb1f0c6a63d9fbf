//! Shared domain types for the courier gateway.
//!
//! This crate contains the types used across the gateway: the reply
//! envelope, contact identifiers and cursor state, message shapes, the
//! configuration surface, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod contact;
pub mod envelope;
pub mod error;
pub mod message;
