//! Document validation against a schema descriptor.
//!
//! Validation semantics:
//! - Every required field must be present with a value whose observed kind
//!   satisfies the declared domain
//! - A present optional field must also satisfy its domain; an absent
//!   optional field is no violation
//! - Undeclared fields are permitted (the descriptor is a lower bound)
//! - All violations are collected, never short-circuited
//!
//! The engine is stateless and safe for unbounded concurrent use. It never
//! mutates documents and decides nothing about persistence; that belongs to
//! the storage engine consuming the outcome.

use std::sync::Arc;

use serde_json::Value;

use crate::observability::{EventKind, ObservedEvent, Recorder};
use crate::schema::SchemaDescriptor;

use super::outcome::{ValidationMode, ValidationOutcome, ValueKind, Violation};

/// Evaluates candidate documents against schema descriptors.
#[derive(Default, Clone)]
pub struct ValidationEngine {
    recorder: Option<Arc<dyn Recorder>>,
}

impl ValidationEngine {
    /// Create an engine that surfaces warn-mode reports nowhere.
    pub fn new() -> Self {
        Self { recorder: None }
    }

    /// Create an engine that surfaces warn-mode reports to `recorder`.
    pub fn with_recorder(recorder: Arc<dyn Recorder>) -> Self {
        Self {
            recorder: Some(recorder),
        }
    }

    /// Validate a document against a descriptor under the given mode.
    pub fn validate(
        &self,
        document: &Value,
        descriptor: &SchemaDescriptor,
        mode: ValidationMode,
    ) -> ValidationOutcome {
        if mode == ValidationMode::Off {
            return ValidationOutcome::Accepted;
        }

        let violations = collect_violations(document, descriptor);
        if violations.is_empty() {
            return ValidationOutcome::Accepted;
        }

        match mode {
            ValidationMode::Enforce => ValidationOutcome::Rejected(violations),
            ValidationMode::Warn => {
                self.surface_warnings(&violations);
                ValidationOutcome::AcceptedWithWarnings(violations)
            }
            ValidationMode::Off => unreachable!("off mode returns early"),
        }
    }

    fn surface_warnings(&self, violations: &[Violation]) {
        let Some(recorder) = self.recorder.as_ref() else {
            return;
        };
        for violation in violations {
            recorder.record(
                &ObservedEvent::new(EventKind::ValidationWarning)
                    .with_field(violation.field())
                    .with_detail(violation.to_string()),
            );
        }
    }
}

/// Collect every violation of `descriptor` in `document`, in field
/// declaration order.
fn collect_violations(document: &Value, descriptor: &SchemaDescriptor) -> Vec<Violation> {
    let Some(object) = document.as_object() else {
        return vec![Violation::NotADocument {
            actual: ValueKind::of(document),
        }];
    };

    let mut violations = Vec::new();
    for spec in descriptor.fields() {
        match object.get(&spec.name) {
            Some(value) => {
                let kind = ValueKind::of(value);
                if !kind.satisfies(spec.domain) {
                    violations.push(Violation::KindMismatch {
                        field: spec.name.clone(),
                        expected: spec.domain,
                        actual: kind,
                    });
                }
            }
            None => {
                if spec.required {
                    violations.push(Violation::MissingField {
                        field: spec.name.clone(),
                        expected: spec.domain,
                    });
                }
            }
        }
    }
    violations
}
