//! The provisioning orchestrator.
//!
//! `reconcile` converges one collection target: collection existence,
//! validator, index set, credential. It is idempotent and safe to re-run;
//! it never rolls back a successful step and never drops an existing
//! collection's data. Every step outcome is recorded and captured in the
//! returned report; failures are returned, not thrown.

use crate::config::{CollectionTarget, CredentialSpec};
use crate::observability::{EventKind, ObservedEvent, Recorder};

use super::engine::{EngineAdmin, EngineError};
use super::errors::ProvisionError;
use super::lock::TargetLocks;
use super::report::{ProvisioningReport, Step, StepOutcome};

/// Reconciles collection targets against live engine state.
pub struct ProvisioningOrchestrator<'a> {
    engine: &'a dyn EngineAdmin,
    recorder: &'a dyn Recorder,
}

impl<'a> ProvisioningOrchestrator<'a> {
    /// Create an orchestrator over an engine and a recorder.
    pub fn new(engine: &'a dyn EngineAdmin, recorder: &'a dyn Recorder) -> Self {
        Self { engine, recorder }
    }

    /// Converge live state to `target`.
    ///
    /// Steps run in order: ensure collection, apply validator, apply
    /// indexes, ensure credential. The validator and index steps are
    /// skipped when the collection could not be ensured, since they address
    /// the missing collection; the credential step is independent and
    /// always runs when a credential is declared.
    pub fn reconcile(&self, target: &CollectionTarget) -> ProvisioningReport {
        self.recorder.record(
            &ObservedEvent::new(EventKind::ReconcileBegin).with_collection(target.name()),
        );

        let mut report = ProvisioningReport::begin(target.name());
        let validator = target.schema().validator_spec();

        let outcome = self.ensure_collection(target, &validator);
        self.record_step(target.name(), Step::EnsureCollection, &outcome);
        report.push(Step::EnsureCollection, outcome);
        let collection_ensured = report
            .last()
            .map_or(false, |entry| entry.outcome.is_converged());

        for step in [Step::ApplyValidator, Step::ApplyIndexes] {
            let outcome = if collection_ensured {
                match step {
                    Step::ApplyValidator => self.apply_validator(target, &validator),
                    Step::ApplyIndexes => self.apply_indexes(target),
                    _ => unreachable!(),
                }
            } else {
                StepOutcome::Skipped("collection not ensured".into())
            };
            self.record_step(target.name(), step, &outcome);
            report.push(step, outcome);
        }

        if let Some(credential) = target.credential() {
            let outcome = self.ensure_credential(credential);
            self.record_step(target.name(), Step::EnsureCredential, &outcome);
            report.push(Step::EnsureCredential, outcome);
        }

        let report = report.finish();
        self.recorder.record(
            &ObservedEvent::new(EventKind::ReconcileComplete)
                .with_collection(report.collection())
                .with_detail(report.to_string()),
        );
        report
    }

    /// Reconcile under the advisory lock for this target's name, so
    /// concurrent runs against the same target are serialized. Runs against
    /// distinct targets proceed in parallel.
    pub fn reconcile_serialized(
        &self,
        locks: &TargetLocks,
        target: &CollectionTarget,
    ) -> ProvisioningReport {
        let slot = locks.slot(target.name());
        let _guard = slot.lock().unwrap();
        self.reconcile(target)
    }

    fn ensure_collection(
        &self,
        target: &CollectionTarget,
        validator: &serde_json::Value,
    ) -> StepOutcome {
        match self.engine.collection_exists(target.name()) {
            Ok(true) => StepOutcome::Unchanged,
            Ok(false) => {
                match self
                    .engine
                    .create_collection(target.name(), validator, target.mode())
                {
                    Ok(()) => StepOutcome::Applied("collection created".into()),
                    Err(source) => {
                        StepOutcome::Failed(ProvisionError::CollectionEnsureFailed { source })
                    }
                }
            }
            Err(source) => StepOutcome::Failed(ProvisionError::CollectionEnsureFailed { source }),
        }
    }

    fn apply_validator(
        &self,
        target: &CollectionTarget,
        validator: &serde_json::Value,
    ) -> StepOutcome {
        match self
            .engine
            .set_validator(target.name(), validator, target.mode())
        {
            Ok(()) => StepOutcome::Applied(format!("validator set, mode {}", target.mode())),
            Err(source) => StepOutcome::Failed(ProvisionError::ValidatorApplyFailed { source }),
        }
    }

    fn apply_indexes(&self, target: &CollectionTarget) -> StepOutcome {
        let live = match self.engine.list_indexes(target.name()) {
            Ok(live) => live,
            Err(source) => return StepOutcome::Failed(ProvisionError::IndexListFailed { source }),
        };

        let diff = target.index_plan().diff(&live);
        if diff.is_converged() {
            return StepOutcome::Unchanged;
        }

        // Drops before creates; abort on first failure, index operations
        // are not a transactional set.
        for index_name in &diff.to_drop {
            if let Err(source) = self.engine.drop_index(target.name(), index_name) {
                return StepOutcome::Failed(ProvisionError::IndexApplyFailed {
                    index: index_name.clone(),
                    source,
                });
            }
        }
        for definition in &diff.to_create {
            if let Err(source) = self.engine.create_index(target.name(), definition) {
                return StepOutcome::Failed(ProvisionError::IndexApplyFailed {
                    index: definition.name.clone(),
                    source,
                });
            }
        }

        StepOutcome::Applied(format!(
            "{} created, {} dropped, {} unchanged",
            diff.to_create.len(),
            diff.to_drop.len(),
            diff.unchanged.len()
        ))
    }

    fn ensure_credential(&self, credential: &CredentialSpec) -> StepOutcome {
        match self.engine.create_credential(credential) {
            Ok(()) => StepOutcome::Applied(format!("credential '{}' created", credential.user)),
            // Already provisioned on a prior run
            Err(EngineError::Conflict(_)) => StepOutcome::Unchanged,
            Err(source) => StepOutcome::Failed(ProvisionError::CredentialApplyFailed {
                user: credential.user.clone(),
                source,
            }),
        }
    }

    fn record_step(&self, collection: &str, step: Step, outcome: &StepOutcome) {
        let event = match outcome {
            StepOutcome::Unchanged => ObservedEvent::new(EventKind::StepUnchanged),
            StepOutcome::Applied(detail) => {
                ObservedEvent::new(EventKind::StepApplied).with_detail(detail.clone())
            }
            StepOutcome::Skipped(reason) => {
                ObservedEvent::new(EventKind::StepSkipped).with_detail(reason.clone())
            }
            StepOutcome::Failed(err) => {
                ObservedEvent::new(EventKind::StepFailed).with_error(err.to_string())
            }
        };
        self.recorder
            .record(&event.with_collection(collection).with_step(step.as_str()));
    }
}
