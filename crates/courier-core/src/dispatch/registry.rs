//! Subject -> handler table, built once at startup.
//!
//! Registration order across sets is irrelevant. A duplicate full subject is
//! an initialization error: startup must fail instead of silently shadowing
//! a handler at runtime.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::handler::{HandlerFn, HandlerSet, PayloadSchema};
use crate::subject;

/// Errors raised while building the registry. Fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two registrations resolved to the same full subject.
    #[error("duplicate handler subject '{0}'")]
    DuplicateSubject(String),

    /// A prefix or subject failed validation.
    #[error("invalid handler subject '{subject}': {reason}")]
    InvalidSubject { subject: String, reason: String },
}

/// A resolved registry entry.
pub struct RegisteredHandler {
    pub(crate) schema: Option<Arc<dyn PayloadSchema>>,
    pub(crate) handler: HandlerFn,
}

/// Immutable subject -> handler table.
pub struct HandlerRegistry {
    entries: BTreeMap<String, RegisteredHandler>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("subjects", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// Resolve every declared handler to its full subject and build the
    /// table, failing fast on invalid or duplicate subjects.
    pub fn build(sets: Vec<HandlerSet>) -> Result<Self, RegistryError> {
        let mut entries = BTreeMap::new();

        for set in sets {
            for registration in set.registrations {
                let full_subject = subject::join(set.prefix.as_deref(), &registration.subject);
                subject::validate(&full_subject).map_err(|reason| {
                    RegistryError::InvalidSubject {
                        subject: full_subject.clone(),
                        reason,
                    }
                })?;

                if entries.contains_key(&full_subject) {
                    return Err(RegistryError::DuplicateSubject(full_subject));
                }

                debug!(subject = %full_subject, "registered handler");
                entries.insert(
                    full_subject,
                    RegisteredHandler {
                        schema: registration.schema,
                        handler: registration.handler,
                    },
                );
            }
        }

        Ok(Self { entries })
    }

    /// The full subjects in the table, in lexicographic order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> BTreeMap<String, RegisteredHandler> {
        self.entries
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::handler::raw;
    use serde_json::Value;

    fn noop(subject: &str) -> crate::dispatch::handler::HandlerRegistration {
        raw(subject, |value: Value| async move { Ok(value) })
    }

    #[test]
    fn prefix_and_suffix_are_joined() {
        let registry = HandlerRegistry::build(vec![
            HandlerSet::new("respondio.starfruit.req").register(noop("message.send")),
        ])
        .unwrap();

        let subjects: Vec<&str> = registry.subjects().collect();
        assert_eq!(subjects, vec!["respondio.starfruit.req.message.send"]);
    }

    #[test]
    fn root_set_uses_subject_as_is() {
        let registry =
            HandlerRegistry::build(vec![HandlerSet::root().register(noop("svc.status"))]).unwrap();
        assert_eq!(registry.subjects().collect::<Vec<_>>(), vec!["svc.status"]);
    }

    #[test]
    fn duplicate_subject_across_sets_fails_fast() {
        let err = HandlerRegistry::build(vec![
            HandlerSet::new("svc").register(noop("op")),
            HandlerSet::root().register(noop("svc.op")),
        ])
        .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateSubject(s) if s == "svc.op"));
    }

    #[test]
    fn duplicate_subject_within_a_set_fails_fast() {
        let err = HandlerRegistry::build(vec![
            HandlerSet::new("svc").register(noop("op")).register(noop("op")),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSubject(_)));
    }

    #[test]
    fn registration_order_is_irrelevant() {
        let a = HandlerRegistry::build(vec![
            HandlerSet::root().register(noop("a.b")).register(noop("a.c")),
        ])
        .unwrap();
        let b = HandlerRegistry::build(vec![
            HandlerSet::root().register(noop("a.c")).register(noop("a.b")),
        ])
        .unwrap();
        assert_eq!(
            a.subjects().collect::<Vec<_>>(),
            b.subjects().collect::<Vec<_>>()
        );
    }

    #[test]
    fn invalid_subject_is_rejected() {
        let err =
            HandlerRegistry::build(vec![HandlerSet::new("svc").register(noop("op..x"))])
                .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSubject { .. }));
    }

    #[test]
    fn empty_registry_is_allowed() {
        let registry = HandlerRegistry::build(Vec::new()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
