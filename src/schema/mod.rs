//! Schema descriptor subsystem for docward
//!
//! A `SchemaDescriptor` is the declarative, versionable description of a
//! document type's structural contract: which fields exist, which are
//! required, and the value domain each must inhabit.
//!
//! # Design Principles
//!
//! - Immutable after construction
//! - Invariants enforced at construction, never at use
//! - Typed field domains instead of untyped nested validator objects
//! - Declaration order preserved end to end

mod errors;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use types::{FieldDomain, FieldSpec, SchemaDescriptor};
