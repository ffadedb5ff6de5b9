//! Storage-engine admin seam.
//!
//! `EngineAdmin` is the narrow interface the orchestrator drives: collection
//! existence and creation, validator set, index listing and mutation, and
//! credential creation. Every call is synchronous and individually fallible.
//! The crate never touches storage or query internals.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

use crate::config::CredentialSpec;
use crate::index::IndexDefinition;
use crate::validation::ValidationMode;

/// Result type for engine admin calls
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a single engine admin call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Transport failure or timeout reaching the engine; retryable.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The caller lacks the privilege for this operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The operation collides with existing state (e.g. the credential
    /// already exists).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other engine-side failure.
    #[error("engine operation failed: {0}")]
    Failed(String),
}

impl EngineError {
    /// Whether this failure is a privilege problem.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, EngineError::PermissionDenied(_))
    }

    /// Whether this failure indicates the engine could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EngineError::Unavailable(_))
    }
}

/// Narrow admin interface onto a document-store engine.
pub trait EngineAdmin: Send + Sync {
    /// Whether the collection exists.
    fn collection_exists(&self, name: &str) -> EngineResult<bool>;

    /// Create the collection with the given validator spec and mode.
    fn create_collection(
        &self,
        name: &str,
        validator: &Value,
        mode: ValidationMode,
    ) -> EngineResult<()>;

    /// Overwrite the collection's validator spec and mode.
    fn set_validator(&self, name: &str, validator: &Value, mode: ValidationMode)
        -> EngineResult<()>;

    /// List the collection's live secondary indexes.
    fn list_indexes(&self, name: &str) -> EngineResult<Vec<IndexDefinition>>;

    /// Create one secondary index.
    fn create_index(&self, name: &str, def: &IndexDefinition) -> EngineResult<()>;

    /// Drop one secondary index by name.
    fn drop_index(&self, name: &str, index_name: &str) -> EngineResult<()>;

    /// Create an application credential. Fails with `Conflict` if the user
    /// already exists.
    fn create_credential(&self, spec: &CredentialSpec) -> EngineResult<()>;
}

/// Live state of one in-memory collection.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    /// Current validator spec
    pub validator: Value,
    /// Current validation mode
    pub mode: ValidationMode,
    /// Current secondary indexes
    pub indexes: Vec<IndexDefinition>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, MemoryCollection>,
    credentials: BTreeMap<String, CredentialSpec>,
    operations: Vec<String>,
    fail_index: Option<String>,
    deny_credentials: bool,
    unavailable: bool,
}

/// In-memory `EngineAdmin` double.
///
/// Backs orchestrator tests and dry runs: it keeps full collection state,
/// journals every mutating call, and can inject failures.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: Mutex<MemoryState>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Make creation of the named index fail with `Failed`.
    pub fn fail_index_create(&self, index_name: impl Into<String>) {
        self.state.lock().unwrap().fail_index = Some(index_name.into());
    }

    /// Make credential creation fail with `PermissionDenied`.
    pub fn deny_credential_creation(&self, deny: bool) {
        self.state.lock().unwrap().deny_credentials = deny;
    }

    /// Snapshot of one collection's live state.
    pub fn collection(&self, name: &str) -> Option<MemoryCollection> {
        self.state.lock().unwrap().collections.get(name).cloned()
    }

    /// Snapshot of a provisioned credential.
    pub fn credential(&self, user: &str) -> Option<CredentialSpec> {
        self.state.lock().unwrap().credentials.get(user).cloned()
    }

    /// Journal of mutating calls, in invocation order.
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().operations.clone()
    }

    fn check_available(state: &MemoryState) -> EngineResult<()> {
        if state.unavailable {
            return Err(EngineError::Unavailable("engine marked unavailable".into()));
        }
        Ok(())
    }
}

impl EngineAdmin for MemoryEngine {
    fn collection_exists(&self, name: &str) -> EngineResult<bool> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.collections.contains_key(name))
    }

    fn create_collection(
        &self,
        name: &str,
        validator: &Value,
        mode: ValidationMode,
    ) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        if state.collections.contains_key(name) {
            return Err(EngineError::Conflict(format!(
                "collection '{}' already exists",
                name
            )));
        }
        state.collections.insert(
            name.to_string(),
            MemoryCollection {
                validator: validator.clone(),
                mode,
                indexes: Vec::new(),
            },
        );
        state.operations.push(format!("create_collection {}", name));
        Ok(())
    }

    fn set_validator(
        &self,
        name: &str,
        validator: &Value,
        mode: ValidationMode,
    ) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let collection = state
            .collections
            .get_mut(name)
            .ok_or_else(|| EngineError::Failed(format!("no collection '{}'", name)))?;
        collection.validator = validator.clone();
        collection.mode = mode;
        state.operations.push(format!("set_validator {}", name));
        Ok(())
    }

    fn list_indexes(&self, name: &str) -> EngineResult<Vec<IndexDefinition>> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let collection = state
            .collections
            .get(name)
            .ok_or_else(|| EngineError::Failed(format!("no collection '{}'", name)))?;
        Ok(collection.indexes.clone())
    }

    fn create_index(&self, name: &str, def: &IndexDefinition) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        if state.fail_index.as_deref() == Some(def.name.as_str()) {
            return Err(EngineError::Failed(format!(
                "index build '{}' failed",
                def.name
            )));
        }
        let collection = state
            .collections
            .get_mut(name)
            .ok_or_else(|| EngineError::Failed(format!("no collection '{}'", name)))?;
        if collection.indexes.iter().any(|i| i.name == def.name) {
            return Err(EngineError::Conflict(format!(
                "index '{}' already exists",
                def.name
            )));
        }
        collection.indexes.push(def.clone());
        state
            .operations
            .push(format!("create_index {} {}", name, def.name));
        Ok(())
    }

    fn drop_index(&self, name: &str, index_name: &str) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let collection = state
            .collections
            .get_mut(name)
            .ok_or_else(|| EngineError::Failed(format!("no collection '{}'", name)))?;
        let before = collection.indexes.len();
        collection.indexes.retain(|i| i.name != index_name);
        if collection.indexes.len() == before {
            return Err(EngineError::Failed(format!(
                "no index '{}' on '{}'",
                index_name, name
            )));
        }
        state
            .operations
            .push(format!("drop_index {} {}", name, index_name));
        Ok(())
    }

    fn create_credential(&self, spec: &CredentialSpec) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        if state.deny_credentials {
            return Err(EngineError::PermissionDenied(
                "not privileged to create credentials".into(),
            ));
        }
        if state.credentials.contains_key(&spec.user) {
            return Err(EngineError::Conflict(format!(
                "user '{}' already exists",
                spec.user
            )));
        }
        state.credentials.insert(spec.user.clone(), spec.clone());
        state
            .operations
            .push(format!("create_credential {}", spec.user));
        Ok(())
    }
}
