//! Subject-routed request/reply dispatch.
//!
//! Handlers are declared as a static registration table
//! ([`handler::HandlerSet`]), resolved once at startup by
//! [`registry::HandlerRegistry`], and served by [`dispatcher::Dispatcher`]
//! with one independent receive loop per subject.

pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use handler::{HandlerRegistration, HandlerSet, PayloadSchema, TypedSchema, raw, typed};
pub use registry::{HandlerRegistry, RegistryError};
