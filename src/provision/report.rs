//! Structured provisioning reports.
//!
//! A reconcile run returns a report, not console narration: one entry per
//! executed step, with step identity and outcome, so a caller can retry
//! individual steps programmatically.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::ProvisionError;

/// Identity of a provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Ensure the collection exists
    EnsureCollection,
    /// Apply the declared validator and mode
    ApplyValidator,
    /// Converge the secondary index set
    ApplyIndexes,
    /// Ensure the application credential exists
    EnsureCredential,
}

impl Step {
    /// Returns the step code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::EnsureCollection => "ENSURE_COLLECTION",
            Step::ApplyValidator => "APPLY_VALIDATOR",
            Step::ApplyIndexes => "APPLY_INDEXES",
            Step::EnsureCredential => "ENSURE_CREDENTIAL",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Live state already matched the target
    Unchanged,
    /// Live state was changed; detail describes what was applied
    Applied(String),
    /// The step did not run because a prerequisite step failed
    Skipped(String),
    /// The step failed
    Failed(ProvisionError),
}

impl StepOutcome {
    /// Whether this outcome leaves the step converged.
    pub fn is_converged(&self) -> bool {
        matches!(self, StepOutcome::Unchanged | StepOutcome::Applied(_))
    }

    /// Whether the step failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// One step's entry in a provisioning report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Step identity
    pub step: Step,
    /// What happened
    pub outcome: StepOutcome,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Unchanged => write!(f, "{}: unchanged", self.step),
            StepOutcome::Applied(detail) => write!(f, "{}: applied ({})", self.step, detail),
            StepOutcome::Skipped(reason) => write!(f, "{}: skipped ({})", self.step, reason),
            StepOutcome::Failed(err) => write!(f, "{}: failed ({})", self.step, err),
        }
    }
}

/// Result of one reconcile run against one collection target.
#[derive(Debug, Clone)]
pub struct ProvisioningReport {
    run_id: Uuid,
    collection: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    steps: Vec<StepReport>,
}

impl ProvisioningReport {
    /// Start building a report for `collection`.
    pub(crate) fn begin(collection: impl Into<String>) -> ReportBuilder {
        ReportBuilder {
            run_id: Uuid::new_v4(),
            collection: collection.into(),
            started_at: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Unique ID of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Collection the run targeted.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// When the run started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the run finished.
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// All executed steps in order.
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// The entry for one step, if it was executed.
    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }

    /// Steps that failed.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.outcome.is_failed())
    }

    /// Whether every executed step converged.
    pub fn fully_converged(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_converged())
    }
}

impl fmt::Display for ProvisioningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failed_steps().count();
        if self.fully_converged() {
            write!(
                f,
                "collection '{}': fully converged ({} steps)",
                self.collection,
                self.steps.len()
            )
        } else {
            write!(
                f,
                "collection '{}': partially converged ({} of {} steps failed)",
                self.collection,
                failed,
                self.steps.len()
            )
        }
    }
}

/// Accumulates step entries during a reconcile run.
pub(crate) struct ReportBuilder {
    run_id: Uuid,
    collection: String,
    started_at: DateTime<Utc>,
    steps: Vec<StepReport>,
}

impl ReportBuilder {
    pub(crate) fn push(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push(StepReport { step, outcome });
    }

    pub(crate) fn last(&self) -> Option<&StepReport> {
        self.steps.last()
    }

    pub(crate) fn finish(self) -> ProvisioningReport {
        ProvisioningReport {
            run_id: self.run_id,
            collection: self.collection,
            started_at: self.started_at,
            finished_at: Utc::now(),
            steps: self.steps,
        }
    }
}
