//! Schema configuration errors.
//!
//! These are static-configuration failures: they are raised while a
//! descriptor is constructed, before any engine call is made.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Invalid schema configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A descriptor must mark at least one field as required.
    #[error("schema declares no required fields")]
    NoRequiredFields,

    /// Field names must be unique within a descriptor.
    #[error("duplicate field '{0}' in schema")]
    DuplicateField(String),

    /// Field names must be non-empty.
    #[error("schema declares a field with an empty name")]
    EmptyFieldName,
}
