//! Advisory per-target locks.
//!
//! Reconcile runs against the same collection target must be serialized to
//! prevent interleaved validator and index mutations; runs against distinct
//! targets need no coordination. `TargetLocks` provides that serialization
//! within one process, keyed by collection name. Cross-process exclusion
//! (e.g. a lock document in the engine) is the deployer's concern.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Name-keyed registry of advisory locks.
#[derive(Debug, Default)]
pub struct TargetLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TargetLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock slot for one collection name. Holding the returned mutex
    /// excludes every other holder of the same name; distinct names never
    /// contend.
    pub fn slot(&self, name: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap();
        slots.entry(name.to_string()).or_default().clone()
    }
}
