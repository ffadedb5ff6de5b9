//! Configuration subsystem for docward
//!
//! The declarative configuration document is the sole externally persisted
//! artifact: one or more collection targets, each carrying a field schema,
//! a validation mode, an index list, and an optional credential spec.
//!
//! # Design Principles
//!
//! - Constructed once at process start, read-only thereafter
//! - Invariants enforced at construction and during deserialization alike
//! - Validation mode is always declared explicitly, never defaulted
//! - Bad configuration fails fast, before any engine call

mod errors;
mod loader;
mod types;

pub use errors::{ConfigError, ConfigResult};
pub use types::{CollectionTarget, CredentialSpec, ProvisioningConfig};
