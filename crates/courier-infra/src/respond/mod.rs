//! respond.io HTTP client.

pub mod client;
pub mod types;

pub use client::RespondClient;
