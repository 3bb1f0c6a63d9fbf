//! Handler declarations: subject, optional payload schema, handler function.
//!
//! A [`HandlerSet`] groups registrations under an optional subject prefix
//! (the class-level prefix of the original declaration style, kept as plain
//! data). The full subject is `<prefix>.<subject>`.

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use courier_types::error::HandlerFailure;

/// Boxed async handler: decoded payload in, result or failure out.
pub type HandlerFn =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, HandlerFailure>> + Send + Sync>;

/// Structural payload validation, applied before the handler is invoked.
pub trait PayloadSchema: Send + Sync {
    /// Return the field error messages if the payload does not conform.
    fn validate(&self, payload: &Value) -> Result<(), Vec<String>>;
}

/// Schema that validates by typed deserialization into `T`.
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> PayloadSchema for TypedSchema<T> {
    fn validate(&self, payload: &Value) -> Result<(), Vec<String>> {
        match serde_json::from_value::<T>(payload.clone()) {
            Ok(_) => Ok(()),
            Err(err) => Err(vec![err.to_string()]),
        }
    }
}

/// One declared handler: subject suffix, optional schema, handler function.
pub struct HandlerRegistration {
    pub(crate) subject: String,
    pub(crate) schema: Option<Arc<dyn PayloadSchema>>,
    pub(crate) handler: HandlerFn,
}

/// Build a registration with a typed payload.
///
/// The schema validates by deserializing into `T`; the handler receives the
/// typed payload directly.
pub fn typed<T, F, Fut>(subject: impl Into<String>, f: F) -> HandlerRegistration
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerFailure>> + Send + 'static,
{
    HandlerRegistration {
        subject: subject.into(),
        schema: Some(Arc::new(TypedSchema::<T>::new())),
        handler: Arc::new(move |value: Value| -> BoxFuture<'static, Result<Value, HandlerFailure>> {
            match serde_json::from_value::<T>(value) {
                Ok(payload) => Box::pin(f(payload)),
                // Unreachable when the schema ran first; kept as a failure
                // rather than a panic for raw invocations.
                Err(err) => Box::pin(futures_util::future::ready(Err(HandlerFailure::new(
                    "ValidationError",
                    err.to_string(),
                )))),
            }
        }),
    }
}

/// Build a registration without a schema; the handler receives raw JSON.
pub fn raw<F, Fut>(subject: impl Into<String>, f: F) -> HandlerRegistration
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerFailure>> + Send + 'static,
{
    HandlerRegistration {
        subject: subject.into(),
        schema: None,
        handler: Arc::new(
            move |value: Value| -> BoxFuture<'static, Result<Value, HandlerFailure>> {
                Box::pin(f(value))
            },
        ),
    }
}

/// A group of registrations sharing an optional subject prefix.
pub struct HandlerSet {
    pub(crate) prefix: Option<String>,
    pub(crate) registrations: Vec<HandlerRegistration>,
}

impl HandlerSet {
    /// Create a set whose registrations are prefixed with `prefix.`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            registrations: Vec::new(),
        }
    }

    /// Create a set with no prefix; registrations use their subject as-is.
    pub fn root() -> Self {
        Self {
            prefix: None,
            registrations: Vec::new(),
        }
    }

    /// Add a registration to the set.
    pub fn register(mut self, registration: HandlerRegistration) -> Self {
        self.registrations.push(registration);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
