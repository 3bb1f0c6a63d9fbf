//! Reply envelope for request/reply exchanges over the bus.
//!
//! Every reply is wrapped in a consistent envelope:
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "data": { "message": "...", "name": "..." } }
//! ```
//! Validation failures carry a plain string in `data` instead of a
//! `{message, name}` body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HandlerFailure;

/// Uniform `{success, data}` wrapper for every bus reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the handler completed successfully.
    pub success: bool,
    /// Handler result on success, error description on failure.
    pub data: Value,
}

impl Envelope {
    /// Create a success envelope carrying the handler result.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }

    /// Create a failure envelope with an arbitrary data payload.
    pub fn fail(data: Value) -> Self {
        Self {
            success: false,
            data,
        }
    }

    /// Create a failure envelope from a `{message, name}` failure body.
    pub fn failure(failure: &HandlerFailure) -> Self {
        Self::fail(serde_json::json!({
            "message": failure.message,
            "name": failure.name,
        }))
    }

    /// Create the validation-failure envelope: `data` is the plain string
    /// `"Validation error: <joined field messages>"`.
    pub fn validation_failure(field_messages: &[String]) -> Self {
        Self::fail(Value::String(format!(
            "Validation error: {}",
            field_messages.join("; ")
        )))
    }

    /// Render the failure data as a string for error propagation.
    ///
    /// String payloads are returned as-is; anything else is JSON-stringified.
    pub fn data_as_string(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
