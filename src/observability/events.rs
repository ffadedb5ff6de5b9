//! Observable events emitted by validation and provisioning.
//!
//! Events are explicit and typed. Each event serializes to a single JSON
//! object suitable for append-only collection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::logger::Severity;

/// Kinds of observable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A reconcile run started
    ReconcileBegin,
    /// A reconcile run finished (converged or not)
    ReconcileComplete,
    /// A provisioning step found live state already matching the target
    StepUnchanged,
    /// A provisioning step changed live state
    StepApplied,
    /// A provisioning step was skipped because a prerequisite step failed
    StepSkipped,
    /// A provisioning step failed
    StepFailed,
    /// A document violated its schema in warn mode; write was persisted
    ValidationWarning,
}

impl EventKind {
    /// Returns the event code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ReconcileBegin => "RECONCILE_BEGIN",
            EventKind::ReconcileComplete => "RECONCILE_COMPLETE",
            EventKind::StepUnchanged => "STEP_UNCHANGED",
            EventKind::StepApplied => "STEP_APPLIED",
            EventKind::StepSkipped => "STEP_SKIPPED",
            EventKind::StepFailed => "STEP_FAILED",
            EventKind::ValidationWarning => "VALIDATION_WARNING",
        }
    }

    /// Log severity for this event kind.
    pub fn severity(&self) -> Severity {
        match self {
            EventKind::StepFailed => Severity::Error,
            EventKind::ValidationWarning | EventKind::StepSkipped => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single observed event.
///
/// Every event carries an id, a timestamp, and a kind; the remaining fields
/// are populated per kind (step outcomes carry `step`, validation warnings
/// carry `field`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub at: DateTime<Utc>,
    /// Event kind
    pub kind: EventKind,
    /// Collection the event concerns, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Provisioning step name, for step outcome events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    /// Offending field, for validation warnings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Underlying error rendering, for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ObservedEvent {
    /// Create a new event of the given kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            kind,
            collection: None,
            step: None,
            field: None,
            detail: None,
            error: None,
        }
    }

    /// Set the collection name.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set the provisioning step name.
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Set the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the error rendering.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Serialize to a JSON line.
    pub fn to_json(&self) -> String {
        // ObservedEvent contains nothing that can fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}
