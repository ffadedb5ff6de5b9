//! Validation subsystem for docward
//!
//! The `ValidationEngine` evaluates a candidate document against a
//! `SchemaDescriptor` under a validation mode, producing an accept / warn /
//! reject outcome. It is invoked by the storage engine on every write,
//! independent of provisioning.
//!
//! # Design Principles
//!
//! - Stateless and pure; safe for unbounded concurrent use
//! - All violations collected, never short-circuited
//! - No implicit coercion between numeric domains
//! - Persistence decisions belong to the storage engine, not here

mod engine;
mod outcome;

pub use engine::ValidationEngine;
pub use outcome::{ValidationMode, ValidationOutcome, ValueKind, Violation};
