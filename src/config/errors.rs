//! Configuration errors.
//!
//! All of these are fatal to orchestrator startup: a bad declarative
//! configuration is rejected before any engine call is made.

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid or unreadable provisioning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// Offending path
        path: String,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// Configuration document is not valid JSON or fails validation during
    /// deserialization.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A collection target declares an empty name.
    #[error("collection target with an empty name")]
    EmptyCollectionName,

    /// The configuration declares no targets at all.
    #[error("no collection targets declared")]
    NoTargets,

    /// Two targets share a collection name.
    #[error("duplicate collection target '{0}'")]
    DuplicateTarget(String),

    /// Two indexes on one collection share a name.
    #[error("collection '{collection}': duplicate index '{index}'")]
    DuplicateIndex {
        /// Collection declaring the indexes
        collection: String,
        /// Repeated index name
        index: String,
    },

    /// An index declares no keys.
    #[error("collection '{collection}': index '{index}' has an empty key spec")]
    EmptyKeySpec {
        /// Collection declaring the index
        collection: String,
        /// Offending index name
        index: String,
    },

    /// A unique index covers a field that is optional or undeclared.
    #[error(
        "collection '{collection}': unique index '{index}' covers non-required field '{field}'"
    )]
    UniqueIndexField {
        /// Collection declaring the index
        collection: String,
        /// Offending index name
        index: String,
        /// Field that is not a required schema field
        field: String,
    },
}
