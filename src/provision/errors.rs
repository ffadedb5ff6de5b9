//! Provisioning step errors.
//!
//! Per-step engine failures are captured into the `ProvisioningReport` and
//! returned to the caller, never thrown across the reconcile boundary.

use thiserror::Error;

use super::engine::EngineError;
use super::report::Step;

/// Failure of one provisioning step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// Could not establish collection existence or create the collection.
    #[error("collection ensure failed: {source}")]
    CollectionEnsureFailed {
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// Could not apply the declared validator and mode.
    #[error("validator apply failed: {source}")]
    ValidatorApplyFailed {
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// Could not list live indexes; no index operation was attempted.
    #[error("failed to list live indexes: {source}")]
    IndexListFailed {
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// One index operation failed; the remaining index plan was aborted.
    #[error("index '{index}' apply failed: {source}")]
    IndexApplyFailed {
        /// Index whose create or drop failed
        index: String,
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// Could not provision the application credential. Distinct from
    /// collection provisioning failures.
    #[error("credential '{user}' apply failed: {source}")]
    CredentialApplyFailed {
        /// Credential user name
        user: String,
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },
}

impl ProvisionError {
    /// The step this failure belongs to.
    pub fn step(&self) -> Step {
        match self {
            ProvisionError::CollectionEnsureFailed { .. } => Step::EnsureCollection,
            ProvisionError::ValidatorApplyFailed { .. } => Step::ApplyValidator,
            ProvisionError::IndexListFailed { .. } => Step::ApplyIndexes,
            ProvisionError::IndexApplyFailed { .. } => Step::ApplyIndexes,
            ProvisionError::CredentialApplyFailed { .. } => Step::EnsureCredential,
        }
    }

    /// The underlying engine failure.
    pub fn engine_error(&self) -> &EngineError {
        match self {
            ProvisionError::CollectionEnsureFailed { source } => source,
            ProvisionError::ValidatorApplyFailed { source } => source,
            ProvisionError::IndexListFailed { source } => source,
            ProvisionError::IndexApplyFailed { source, .. } => source,
            ProvisionError::CredentialApplyFailed { source, .. } => source,
        }
    }

    /// Whether the failure was a privilege problem.
    pub fn is_permission_denied(&self) -> bool {
        self.engine_error().is_permission_denied()
    }
}
