//! Secondary index definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction or kind of a single index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Ascending ordered key
    Ascending,
    /// Descending ordered key
    Descending,
    /// Full-text key
    Text,
}

impl KeyOrder {
    /// Returns the order name as declared in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOrder::Ascending => "ascending",
            KeyOrder::Descending => "descending",
            KeyOrder::Text => "text",
        }
    }
}

impl fmt::Display for KeyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field of an index key spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    /// Field name the key covers
    pub field: String,
    /// Direction or kind
    pub order: KeyOrder,
}

impl IndexKey {
    /// Create a key over `field` with the given order.
    pub fn new(field: impl Into<String>, order: KeyOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// A declarative secondary index definition.
///
/// Two definitions are the same index only when name, key spec (fields and
/// order, in order), and uniqueness all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name, unique within a collection
    pub name: String,
    /// Ordered key spec
    pub keys: Vec<IndexKey>,
    /// Whether the index enforces key uniqueness
    #[serde(default)]
    pub unique: bool,
}

impl IndexDefinition {
    /// Create a non-unique index with the given key spec.
    pub fn new(name: impl Into<String>, keys: Vec<IndexKey>) -> Self {
        Self {
            name: name.into(),
            keys,
            unique: false,
        }
    }

    /// Create a single-field ascending index.
    pub fn ascending(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, vec![IndexKey::new(field, KeyOrder::Ascending)])
    }

    /// Create a single-field descending index.
    pub fn descending(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, vec![IndexKey::new(field, KeyOrder::Descending)])
    }

    /// Create a full-text index over the given fields.
    pub fn text<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            fields
                .into_iter()
                .map(|f| IndexKey::new(f, KeyOrder::Text))
                .collect(),
        )
    }

    /// Mark the index unique.
    pub fn into_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Whether any key is a full-text key.
    pub fn is_text(&self) -> bool {
        self.keys.iter().any(|k| k.order == KeyOrder::Text)
    }

    /// Whether `other` declares the same index body (name aside): same key
    /// spec in the same order and same uniqueness.
    pub fn same_definition(&self, other: &IndexDefinition) -> bool {
        self.keys == other.keys && self.unique == other.unique
    }

    /// Fields covered by this index, in key order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.field.as_str())
    }
}
