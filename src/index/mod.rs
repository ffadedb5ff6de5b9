//! Index plan subsystem for docward
//!
//! An `IndexPlan` is the declarative set of secondary index definitions for
//! one collection, plus the diff algorithm converging live engine state to
//! the plan.
//!
//! # Design Principles
//!
//! - Declarative: the plan states target shape, never operations
//! - Replace, never alter: a drifted definition is a drop plus a create
//! - Deterministic, order-independent diffs
//! - Creation ordered by cost: unique, then plain, full-text last

mod plan;
mod types;

pub use plan::{IndexDiff, IndexPlan};
pub use types::{IndexDefinition, IndexKey, KeyOrder};
