//! Index plan diffing.
//!
//! The diff never mutates an index in place: a name present on both sides
//! with a different key spec or uniqueness becomes a drop plus a create,
//! since index definitions cannot be altered atomically by most engines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::IndexDefinition;

/// The declared index set for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexPlan {
    indexes: Vec<IndexDefinition>,
}

impl IndexPlan {
    /// Create a plan from the desired definitions.
    pub fn new(indexes: Vec<IndexDefinition>) -> Self {
        Self { indexes }
    }

    /// Desired definitions in declaration order.
    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    /// Number of desired indexes.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Whether the plan declares no indexes.
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Compute the minimal create/drop set converging `live` to this plan.
    ///
    /// The result is independent of the order of either input.
    pub fn diff(&self, live: &[IndexDefinition]) -> IndexDiff {
        let desired_by_name: BTreeMap<&str, &IndexDefinition> =
            self.indexes.iter().map(|d| (d.name.as_str(), d)).collect();
        let live_by_name: BTreeMap<&str, &IndexDefinition> =
            live.iter().map(|d| (d.name.as_str(), d)).collect();

        let mut to_create = Vec::new();
        let mut to_drop = Vec::new();
        let mut unchanged = Vec::new();

        for (name, desired) in &desired_by_name {
            match live_by_name.get(name) {
                Some(live_def) if desired.same_definition(live_def) => {
                    unchanged.push((*name).to_string());
                }
                Some(_) => {
                    // Definition drifted: replace, never alter
                    to_drop.push((*name).to_string());
                    to_create.push((*desired).clone());
                }
                None => to_create.push((*desired).clone()),
            }
        }

        for name in live_by_name.keys() {
            if !desired_by_name.contains_key(name) {
                to_drop.push((*name).to_string());
            }
        }

        to_drop.sort();
        to_create.sort_by(|a, b| {
            creation_rank(a)
                .cmp(&creation_rank(b))
                .then_with(|| a.name.cmp(&b.name))
        });

        IndexDiff {
            to_create,
            to_drop,
            unchanged,
        }
    }
}

/// Application order for index creation: unique indexes first, then plain
/// ordered indexes, full-text builds last (the most expensive and the most
/// likely to fail independently).
fn creation_rank(def: &IndexDefinition) -> u8 {
    if def.is_text() {
        2
    } else if def.unique {
        0
    } else {
        1
    }
}

/// Result of diffing live indexes against a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDiff {
    /// Definitions to create, in application order
    pub to_create: Vec<IndexDefinition>,
    /// Names to drop, sorted
    pub to_drop: Vec<String>,
    /// Names already matching the plan, sorted
    pub unchanged: Vec<String>,
}

impl IndexDiff {
    /// Whether live state already matches the plan.
    pub fn is_converged(&self) -> bool {
        self.to_create.is_empty() && self.to_drop.is_empty()
    }
}
