//! Dispatch and sync engine for the courier gateway.
//!
//! This crate defines the "ports" (bus transport, external contact API,
//! state store, new-message sink) that the infrastructure layer implements,
//! plus the policy code built on them: subject matching, the handler
//! registry and dispatcher, the typed bus client, the rate-limit retry
//! wrapper, and the polling sync engine. It depends only on
//! `courier-types` -- never on `courier-infra` or any network crate.

pub mod bus;
pub mod dispatch;
pub mod subject;
pub mod sync;
